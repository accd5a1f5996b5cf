//! Integration tests for the Klotho workspace.

/// End-to-end runs of the demonstration flow.
#[cfg(test)]
mod demo_flow_tests {
    use klotho::{
        run_all, BackgroundOutcome, Console, DemoConfig, ExecutorState, ShutdownOutcome,
    };
    use std::time::Duration;

    fn fast_config() -> DemoConfig {
        DemoConfig::builder()
            .background_sleep(Duration::from_millis(20))
            .task_sleep(Duration::from_millis(40))
            .shutdown_timeout(Duration::from_secs(2))
            .join_background(true)
            .build()
            .unwrap()
    }

    #[test]
    fn test_full_run_completes() {
        let (console, capture) = Console::capture();
        let report = run_all(&console, &fast_config()).unwrap();

        assert_eq!(report.streams.sum, Some(48));
        assert_eq!(report.streams.distinct, vec![2, 4, 6, 8, 10, 12, 14]);
        assert_eq!(report.transformed, "i have been called not implemented!!! - testing stuff");
        assert_eq!(report.functional_sum, Some(15));
        assert_eq!(report.concurrency.value, 123);
        assert_eq!(report.concurrency.shutdown.outcome, ShutdownOutcome::Terminated);
        assert_eq!(report.concurrency.shutdown.final_state, ExecutorState::Terminated);
        assert_eq!(report.concurrency.background, Some(BackgroundOutcome::Completed));
        assert!(capture.stderr_lines().is_empty());
    }

    #[test]
    fn test_output_contains_every_demo_line() {
        let (console, capture) = Console::capture();
        run_all(&console, &fast_config()).unwrap();

        let lines = capture.stdout_lines();
        for expected in [
            "Help Me Function",
            "48",
            "Peter Parker",
            "15",
            "Vanilla Foo klotho-vanilla",
            "Vanilla Bar klotho-vanilla",
            "Executor klotho-worker-0",
            "future done? false",
            "future done? true",
            "result: 123",
            "attempt to shutdown executor",
            "shutdown finished",
        ] {
            assert!(lines.iter().any(|l| l == expected), "missing line {expected:?} in {lines:?}");
        }

        let position = |needle: &str| lines.iter().position(|l| l == needle).unwrap();
        assert!(position("future done? false") < position("future done? true"));
        assert!(position("result: 123") < position("attempt to shutdown executor"));
    }

    #[test]
    fn test_custom_value_flows_through() {
        let (console, capture) = Console::capture();
        let config = DemoConfig::builder()
            .background_sleep(Duration::from_millis(5))
            .task_sleep(Duration::from_millis(5))
            .task_value(-9)
            .join_background(true)
            .build()
            .unwrap();

        let report = run_all(&console, &config).unwrap();
        assert_eq!(report.concurrency.value, -9);
        assert!(capture.stdout_lines().contains(&"result: -9".to_string()));
    }
}

/// Executor behaviour observed through the facade crate.
#[cfg(test)]
mod executor_tests {
    use klotho_core::{
        CancellationToken, ExecutorConfig, ExecutorControl, ExecutorError, Task, TaskContext,
        TaskError, TaskId, TaskResult, TaskSpawner,
    };
    use klotho_executor::ThreadPoolExecutor;
    use std::sync::{mpsc, Arc, Mutex};
    use std::time::Duration;

    #[test]
    fn test_single_worker_preserves_order() {
        let executor = ThreadPoolExecutor::single_thread().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let seen = seen.clone();
                executor.submit(move || seen.lock().unwrap().push(i)).unwrap()
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(*seen.lock().unwrap(), (0..50).collect::<Vec<_>>());
        executor.shutdown();
        assert!(executor.await_termination(Duration::from_secs(2)));
    }

    #[test]
    fn test_rejects_after_shutdown() {
        let executor = ThreadPoolExecutor::single_thread().unwrap();
        executor.shutdown();
        assert!(executor.is_shutdown());
        assert!(matches!(executor.execute(|| ()), Err(ExecutorError::Rejected)));
        assert!(matches!(executor.submit(|| 1), Err(ExecutorError::Rejected)));
    }

    #[test]
    fn test_spawn_custom_task() {
        struct Doubler {
            context: TaskContext,
            value: u32,
        }

        impl Task for Doubler {
            type Output = u32;

            fn execute(self, token: &CancellationToken) -> TaskResult<u32> {
                token
                    .check()
                    .map_err(|_| TaskError::interrupted("doubler interrupted"))?;
                Ok(self.value * 2)
            }

            fn context(&self) -> &TaskContext {
                &self.context
            }
        }

        let executor = ThreadPoolExecutor::single_thread().unwrap();
        let context = TaskContext::new(TaskId::new(1)).with_name("doubler");
        let handle = executor.spawn(Doubler { context, value: 21 }).unwrap();
        assert_eq!(handle.join(), Ok(42));
    }

    #[test]
    fn test_shutdown_now_cancels_queue_and_interrupts_running() {
        let executor = ThreadPoolExecutor::new(ExecutorConfig::single_thread()).unwrap();
        let (started_tx, started_rx) = mpsc::channel();
        let running = executor
            .submit_cancellable(move |token| {
                let _ = started_tx.send(());
                token
                    .sleep(Duration::from_secs(30))
                    .map_err(|_| TaskError::interrupted("task interrupted"))?;
                Ok(1)
            })
            .unwrap();
        started_rx.recv().unwrap();

        let ran = Arc::new(Mutex::new(false));
        let flag = ran.clone();
        let queued = executor.submit(move || *flag.lock().unwrap() = true).unwrap();

        assert_eq!(executor.shutdown_now(), 1);
        assert!(matches!(running.join(), Err(TaskError::Fatal { .. })));
        assert_eq!(queued.join(), Err(TaskError::Cancelled));
        assert!(executor.await_termination(Duration::from_secs(2)));
        assert!(!*ran.lock().unwrap());
    }

    #[test]
    fn test_handle_completes_once() {
        let executor = ThreadPoolExecutor::single_thread().unwrap();
        let handle = executor.submit(|| String::from("once")).unwrap();

        assert_eq!(handle.get(), Ok("once".to_string()));
        assert!(handle.is_done());
        assert!(!handle.cancel(true));
        assert_eq!(handle.get(), Ok("once".to_string()));
    }

    #[test]
    fn test_panic_surfaces_and_worker_survives() {
        let executor = ThreadPoolExecutor::single_thread().unwrap();
        let boom = executor.submit(|| -> u8 { panic!("boom") }).unwrap();
        assert_eq!(boom.join(), Err(TaskError::Panicked("boom".into())));

        let after = executor.submit(|| 5).unwrap();
        assert_eq!(after.join(), Ok(5));
    }
}

/// Property-based tests with proptest.
#[cfg(test)]
mod property_tests {
    use klotho::concurrency::shutdown_gracefully;
    use klotho::functional::{Person, PersonFactory};
    use klotho::streams::{doubled_distinct, sum_of_doubled_sixes};
    use klotho::{CancellationToken, Console, ExecutorControl, ExecutorState, ThreadPoolExecutor};
    use proptest::prelude::*;
    use std::time::Duration;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_doubled_sixes_sum(values in prop::collection::vec(0i32..10, 0..100)) {
            let sixes = values.iter().filter(|&&v| v == 6).count();
            let expected = if sixes == 0 {
                None
            } else {
                Some(12 * i32::try_from(sixes).unwrap())
            };
            prop_assert_eq!(sum_of_doubled_sixes(&values), expected);
        }

        #[test]
        fn prop_doubled_distinct_strictly_ascending(values in prop::collection::vec(-1000i32..1000, 0..100)) {
            let result = doubled_distinct(&values);
            prop_assert!(result.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(result.iter().all(|v| v % 2 == 0));
        }

        #[test]
        fn prop_factory_keeps_names(first in "[A-Za-z]{0,12}", last in "[A-Za-z ]{0,12}") {
            let factory = |f: &str, l: &str| Person::new(f, l);
            let person = factory.create(&first, &last);
            prop_assert_eq!(person.first_name(), first.as_str());
            prop_assert_eq!(person.last_name(), last.as_str());
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_shutdown_never_ends_running(tasks in 0usize..4, sleep_ms in 0u64..20, timeout_ms in 0u64..40) {
            let (console, _capture) = Console::capture();
            let executor = ThreadPoolExecutor::single_thread().unwrap();
            for _ in 0..tasks {
                executor
                    .submit_cancellable(move |token| {
                        token.sleep(Duration::from_millis(sleep_ms)).map_err(|_| {
                            klotho::TaskError::interrupted("task interrupted")
                        })
                    })
                    .unwrap();
            }

            let report = shutdown_gracefully(
                &executor,
                Duration::from_millis(timeout_ms),
                &CancellationToken::new(),
                &console,
            );
            prop_assert!(matches!(
                report.final_state,
                ExecutorState::Terminated | ExecutorState::ForceTerminated
            ));
            prop_assert!(executor.is_shutdown());
        }
    }
}

/// Property-based tests with quickcheck.
#[cfg(test)]
mod quickcheck_tests {
    use klotho::functional::Transformer;
    use klotho::streams::summing_function;
    use klotho::ThreadPoolExecutor;
    use klotho_iter::{stream, Stream};
    use quickcheck::{quickcheck, TestResult};

    quickcheck! {
        fn qc_summing_function_matches_iter_sum(values: Vec<i16>) -> bool {
            let values: Vec<i32> = values.into_iter().map(i32::from).collect();
            let expected: Option<i32> = if values.is_empty() { None } else { Some(values.iter().sum()) };
            summing_function()(&values) == expected
        }

        fn qc_distinct_preserves_first_occurrence(values: Vec<u8>) -> bool {
            let distinct: Vec<u8> = stream(values.clone()).distinct().collect();
            let mut expected = Vec::new();
            for v in values {
                if !expected.contains(&v) {
                    expected.push(v);
                }
            }
            distinct == expected
        }

        fn qc_sorted_is_permutation(values: Vec<i32>) -> bool {
            let mut expected = values.clone();
            expected.sort_unstable();
            Stream::of(values).sorted().collect::<Vec<_>>() == expected
        }

        fn qc_transformer_appends_suffix(input: String) -> bool {
            let out = klotho::functional::testing_transformer().call_me(input.clone());
            out.starts_with(&input) && out.ends_with(" - testing stuff")
        }

        fn qc_submit_returns_value(values: Vec<u32>) -> TestResult {
            if values.len() > 32 {
                return TestResult::discard();
            }
            let executor = match ThreadPoolExecutor::single_thread() {
                Ok(executor) => executor,
                Err(_) => return TestResult::discard(),
            };
            let handles: Vec<_> = values
                .iter()
                .map(|&v| executor.submit(move || v.wrapping_mul(3)))
                .collect::<Result<_, _>>()
                .unwrap();
            let results: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
            TestResult::from_bool(results == values.iter().map(|v| v.wrapping_mul(3)).collect::<Vec<_>>())
        }
    }
}
