//! Turn scheduler benchmarks for robo_core.
//!
//! Run with: `cargo bench -p robo_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use robo_core::config::SchedulerConfig;
use robo_core::diagnostics::DiagnosticRecord;
use robo_core::registry::StrategyRegistry;
use robo_core::role::RobotRole;
use robo_core::scheduler::TurnScheduler;
use robo_core::team::Team;
use robo_test_utils::{CallLog, ScriptedController, ScriptedStrategy, Step};

fn scheduler_for(step: Step, rc: &mut ScriptedController) -> TurnScheduler<ScriptedController, Vec<DiagnosticRecord>> {
    let log = CallLog::new();
    let registry = StrategyRegistry::builder()
        .with(RobotRole::Launcher, ScriptedStrategy::always("launcher", step, &log))
        .expect("fresh builder")
        .build();
    TurnScheduler::start(rc, registry, Vec::new(), SchedulerConfig::default())
}

/// Cost of one turn on the clean path and on the fault path.
pub fn turn_benchmark(c: &mut Criterion) {
    c.bench_function("run_turn_completed", |b| {
        let mut rc = ScriptedController::new(RobotRole::Launcher, Team::A, 0).with_ceiling(u32::MAX - 1);
        let mut scheduler = scheduler_for(Step::Succeed, &mut rc);
        b.iter(|| {
            rc.next_round();
            black_box(scheduler.run_turn(&mut rc))
        });
    });

    c.bench_function("run_turn_runtime_fault", |b| {
        let mut rc = ScriptedController::new(RobotRole::Launcher, Team::A, 0);
        let mut scheduler = scheduler_for(Step::RuntimeFault, &mut rc);
        b.iter(|| {
            rc.next_round();
            let report = scheduler.run_turn(&mut rc);
            scheduler.sink_mut().clear();
            black_box(report)
        });
    });
}

criterion_group!(benches, turn_benchmark);
criterion_main!(benches);
