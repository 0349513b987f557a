use std::sync::mpsc;
use std::time::Duration;

use super::*;

#[test]
fn zero_threads_is_rejected() {
    assert!(RayonExecutor::new(Some(0)).is_err());
}

#[test]
fn rayon_executor_runs_jobs_off_thread() {
    let exec = RayonExecutor::new(Some(2)).unwrap();
    assert_eq!(exec.threads(), 2);

    let caller = std::thread::current().id();
    let (tx, rx) = mpsc::channel();
    for i in 0..4 {
        let tx = tx.clone();
        exec.spawn(Box::new(move || {
            tx.send((i, std::thread::current().id())).unwrap();
        }));
    }
    drop(tx);

    let mut seen = Vec::new();
    while let Ok((i, tid)) = rx.recv_timeout(Duration::from_secs(5)) {
        assert_ne!(tid, caller);
        seen.push(i);
    }
    seen.sort_unstable();
    assert_eq!(seen, vec![0, 1, 2, 3]);
}

#[test]
fn inline_executor_runs_immediately() {
    let (tx, rx) = mpsc::channel();
    InlineExecutor.spawn(Box::new(move || tx.send(7).unwrap()));
    assert_eq!(rx.try_recv().unwrap(), 7);
}
