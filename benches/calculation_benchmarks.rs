//! Performance benchmarks for the Leave Entitlement & Balance Engine.
//!
//! This benchmark suite measures:
//! - Entitlement resolution for a single employee
//! - A full balance computation with a year of request history
//! - A verification pass over the same data
//! - The async service path against in-memory stores
//! - Scaling with the number of requests on file
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::sync::Arc;

use chrono::{Days, NaiveDate, NaiveDateTime};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use leave_engine::calculation::{
    BalanceEngine, ReconciliationVerifier, RequestLedger, resolve_entitlements,
};
use leave_engine::config::ConfigLoader;
use leave_engine::config::LeavePolicy;
use leave_engine::models::{EmployeeProfile, LeaveRequestRecord, LeaveStatus, LeaveType, Role};
use leave_engine::service::{
    InMemoryEmployeeDirectory, InMemoryLeaveRequestStore, LeaveBalanceService,
};

fn load_policy() -> LeavePolicy {
    ConfigLoader::load("./config/bcea")
        .expect("Failed to load config")
        .into_policy()
}

fn as_of() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 9, 15)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn create_employee(id: &str, role: Role) -> EmployeeProfile {
    EmployeeProfile {
        id: id.to_string(),
        name: "Bench Employee".to_string(),
        employee_number: format!("B-{}", id),
        department: "Benchmarks".to_string(),
        hire_date: NaiveDate::from_ymd_opt(2016, 4, 18).unwrap(),
        role,
    }
}

/// Creates `count` one-day requests spread over 2024 and 2025.
fn create_requests(employee_id: &str, count: usize) -> Vec<LeaveRequestRecord> {
    let first = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
    let types = [
        LeaveType::Vacation,
        LeaveType::SickLeave,
        LeaveType::Personal,
        LeaveType::StudyLeave,
    ];
    let statuses = [
        LeaveStatus::Approved,
        LeaveStatus::Approved,
        LeaveStatus::Pending,
        LeaveStatus::Rejected,
    ];

    (0..count)
        .map(|i| {
            let start = first
                .checked_add_days(Days::new((i as u64 * 7) % 600))
                .unwrap();
            LeaveRequestRecord {
                id: format!("req_{:05}", i),
                employee_id: employee_id.to_string(),
                leave_type: types[i % types.len()],
                start_date: start,
                end_date: start,
                total_days: Some(if i % 5 == 0 {
                    Decimal::new(5, 1)
                } else {
                    Decimal::ONE
                }),
                status: statuses[i % statuses.len()],
                created_at: start.and_hms_opt(9, 0, 0).unwrap(),
            }
        })
        .collect()
}

/// Benchmark: Entitlement resolution for one employee.
fn bench_resolve_entitlements(c: &mut Criterion) {
    let policy = load_policy();

    c.bench_function("resolve_entitlements", |b| {
        b.iter(|| {
            black_box(resolve_entitlements(
                &policy,
                black_box(Role::SeniorEmployee),
                black_box(9),
                2025,
                1,
            ))
        })
    });
}

/// Benchmark: Full balance computation with 60 requests on file.
fn bench_compute_balances(c: &mut Criterion) {
    let engine = BalanceEngine::new(load_policy());
    let employee = create_employee("emp_bench_001", Role::Employee);
    let ledger = RequestLedger::new(create_requests(&employee.id, 60));

    c.bench_function("compute_balances", |b| {
        b.iter(|| black_box(engine.compute_balances(&employee, &ledger, as_of()).unwrap()))
    });
}

/// Benchmark: Verification pass over the same history.
fn bench_verify_balances(c: &mut Criterion) {
    let verifier = ReconciliationVerifier::new(load_policy());
    let employee = create_employee("emp_bench_001", Role::Employee);
    let ledger = RequestLedger::new(create_requests(&employee.id, 60));

    c.bench_function("verify_balances", |b| {
        b.iter(|| {
            black_box(
                verifier
                    .verify_balances(&employee, &ledger, 2025, as_of())
                    .unwrap(),
            )
        })
    });
}

/// Benchmark: Batch of 100 employees through the async service.
fn bench_service_batch_100(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let roles = [Role::Employee, Role::SeniorEmployee, Role::Intern, Role::Supervisor];

    let service = rt.block_on(async {
        let directory = InMemoryEmployeeDirectory::new();
        let store = InMemoryLeaveRequestStore::new();
        for i in 0..100 {
            let employee = create_employee(&format!("emp_batch_{:03}", i), roles[i % roles.len()]);
            store.extend(create_requests(&employee.id, 20)).await;
            directory.insert(employee).await;
        }
        LeaveBalanceService::new(load_policy(), Arc::new(directory), Arc::new(store))
    });

    let mut group = c.benchmark_group("service_batch");
    group.throughput(Throughput::Elements(100));
    group.sample_size(20);

    group.bench_function("batch_100", |b| {
        b.to_async(&rt).iter(|| async {
            let mut results = Vec::with_capacity(100);
            for i in 0..100 {
                let summary = service
                    .balances(&format!("emp_batch_{:03}", i), as_of())
                    .await
                    .unwrap();
                results.push(summary);
            }
            black_box(results)
        })
    });

    group.finish();
}

/// Benchmark: Various history sizes to understand scaling behavior.
fn bench_scaling(c: &mut Criterion) {
    let engine = BalanceEngine::new(load_policy());
    let employee = create_employee("emp_bench_001", Role::Employee);

    let mut group = c.benchmark_group("scaling");

    for request_count in [1usize, 10, 100, 1000].iter() {
        let ledger = RequestLedger::new(create_requests(&employee.id, *request_count));

        group.throughput(Throughput::Elements(*request_count as u64));
        group.bench_with_input(
            BenchmarkId::new("requests", request_count),
            request_count,
            |b, _| b.iter(|| black_box(engine.compute_balances(&employee, &ledger, as_of()).unwrap())),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_resolve_entitlements,
    bench_compute_balances,
    bench_verify_balances,
    bench_service_batch_100,
    bench_scaling,
);
criterion_main!(benches);
