use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use thiserror::Error;

/// Returned when a job is queued on a pool whose workers are all gone
#[derive(Debug, Error)]
#[error("Thread pool is shut down")]
pub struct PoolClosed;

/// Fixed-size pool of worker threads used by the server to handle connections.
///
/// Modeled on the one in the Rust book:
/// https://doc.rust-lang.org/book/ch20-02-multithreaded.html
/// All workers are joined on drop.
pub struct ThreadPool {
    workers: Vec<Worker>,
    sender: Option<mpsc::Sender<Job>>,
}

impl ThreadPool {
    /// Create a new ThreadPool with `size` threads.
    ///
    /// 'size' must be greater than 0.
    pub fn new(size: usize) -> ThreadPool {
        assert!(size > 0, "ThreadPool size must be greater than 0");

        let (sender, receiver) = mpsc::channel();
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..size)
            .map(|id| Worker::new(id, Arc::clone(&receiver)))
            .collect();
        log::debug!("Started thread pool with {} workers", size);

        ThreadPool {
            workers,
            sender: Some(sender),
        }
    }

    /// Queue a task to run on the threadpool when a worker is available.
    pub fn execute<F>(&self, f: F) -> Result<(), PoolClosed>
    where
        F: FnOnce() + Send + 'static,
    {
        self.sender
            .as_ref()
            .ok_or(PoolClosed)?
            .send(Box::new(f))
            .map_err(|_| PoolClosed)
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        drop(self.sender.take());
        for worker in &mut self.workers {
            if let Some(thread) = worker.handle.take() {
                if thread.join().is_err() {
                    log::error!("Worker {} panicked", worker.id);
                }
            }
        }
    }
}

/// Type of jobs to be executed by the threadpool.
type Job = Box<dyn FnOnce() + Send + 'static>;

struct Worker {
    id: usize,
    handle: Option<thread::JoinHandle<()>>,
}

impl Worker {
    /// Spawn a thread executing jobs from the receiver until the sending side is dropped.
    fn new(id: usize, receiver: Arc<Mutex<mpsc::Receiver<Job>>>) -> Worker {
        let handle = thread::spawn(move || loop {
            // A worker that panicked while holding the lock only poisons it, the receiver
            // itself is still usable.
            let message = receiver
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .recv();
            match message {
                Ok(job) => job(),
                Err(_) => {
                    log::debug!("Worker {} shutting down", id);
                    break;
                }
            }
        });
        Worker {
            id,
            handle: Some(handle),
        }
    }
}
