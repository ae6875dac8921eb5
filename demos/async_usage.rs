//! Async usage examples

use respool::{Pool, PoolConfig, Poolable, ResourceId};
use std::time::Duration;
use tokio::time::sleep;

struct Worker {
    id: ResourceId,
}

impl Worker {
    fn new() -> Self {
        Self {
            id: ResourceId::new(),
        }
    }
}

impl Poolable for Worker {
    fn id(&self) -> ResourceId {
        self.id
    }
}

#[tokio::main]
async fn main() {
    println!("=== respool - Async Examples ===\n");

    // Example 1: Async acquire
    async_acquire().await;

    // Example 2: Async acquire hitting the timeout
    async_with_timeout().await;

    // Example 3: Concurrent tasks sharing one pool
    concurrent_access().await;
}

async fn async_acquire() {
    println!("1. Async Acquire:");
    let pool = Pool::new(PoolConfig::default().opened());
    let _ = pool.add(Worker::new());

    let worker = pool.acquire_async().await.unwrap();
    println!("   Borrowed {} asynchronously", worker.id());
    let _ = pool.release(worker);

    println!();
}

async fn async_with_timeout() {
    println!("2. Async with Timeout:");

    let config = PoolConfig::new()
        .with_timeout(Duration::from_millis(100))
        .opened();
    let pool = Pool::new(config);
    let _ = pool.add(Worker::new());

    // Hold the only worker
    let held = pool.acquire().unwrap();

    match pool.acquire_async().await {
        Ok(_) => println!("   Got a worker"),
        Err(e) => println!("   Error: {}", e),
    }

    let _ = pool.release(held);
    println!();
}

async fn concurrent_access() {
    println!("3. Concurrent Access:");

    let pool = Pool::new(PoolConfig::default().opened());
    for _ in 0..5 {
        let _ = pool.add(Worker::new());
    }

    let mut handles = vec![];

    for i in 0..10 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            if let Some(worker) = pool.try_acquire_async().await {
                println!("   Task {} got {}", i, worker.id());
                sleep(Duration::from_millis(50)).await;
                let _ = pool.release(worker);
            } else {
                println!("   Task {} couldn't get a worker", i);
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    println!("   Final available: {}", pool.available_count());
}
