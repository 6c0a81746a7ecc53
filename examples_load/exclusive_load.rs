use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tracing_log_facade::noop_sink::NoopSink;
use tracing_log_facade::{args, Level, LevelLogger, LineFormat};

fn main() {
    let threads: u64 = 8;
    let per_thread: u64 = 50_000;

    for exclusive in [false, true] {
        let mut logger = LevelLogger::new(Level::Debug, LineFormat::Json, Arc::new(NoopSink));
        if exclusive {
            logger.exclusive();
        }
        let logger = Arc::new(logger);

        let start = Instant::now();
        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let logger = Arc::clone(&logger);
                thread::spawn(move || {
                    for i in 0..per_thread {
                        logger.infof("worker %d iteration %d", args![t, i]);
                    }
                })
            })
            .collect();
        for handle in handles {
            let _ = handle.join();
        }

        let n = threads * per_thread;
        let elapsed = start.elapsed();
        println!(
            "exclusive={}: wrote {} lines in {:?} (~{:.0} lines/s)",
            exclusive,
            n,
            elapsed,
            n as f64 / elapsed.as_secs_f64()
        );
    }
}
