//! Shutdown and retirement examples: graceful close, immediate close,
//! and removing a resource that is currently borrowed

use respool::{Pool, PoolConfig, Poolable, ResourceId};
use std::thread;
use std::time::Duration;

struct Session {
    id: ResourceId,
}

impl Session {
    fn new() -> Self {
        Self {
            id: ResourceId::new(),
        }
    }

    fn with_id(id: ResourceId) -> Self {
        Self { id }
    }
}

impl Poolable for Session {
    fn id(&self) -> ResourceId {
        self.id
    }
}

fn main() {
    println!("=== respool - Shutdown Examples ===\n");

    graceful_close();
    immediate_close();
    remove_while_borrowed();
}

fn graceful_close() {
    println!("1. Graceful Close (drains in-flight borrows):");
    let pool = Pool::new(PoolConfig::default().opened());
    let _ = pool.add(Session::new());

    let session = pool.acquire().unwrap();
    let worker = {
        let pool = pool.clone();
        thread::spawn(move || {
            println!("   Worker using {}", session.id());
            thread::sleep(Duration::from_millis(300));
            let _ = pool.release(session);
            println!("   Worker released its session");
        })
    };

    println!("   Closing: waiting for {} outstanding...", pool.outstanding_count());
    pool.close();
    println!("   Closed, open = {}\n", pool.is_open());
    worker.join().unwrap();
}

fn immediate_close() {
    println!("2. Immediate Close (no drain):");
    let pool = Pool::new(PoolConfig::default().opened());
    let _ = pool.add(Session::new());
    let session = pool.acquire().unwrap();

    pool.close_now();
    println!("   Closed with {} still outstanding", pool.outstanding_count());

    // The borrow can still come home after closing
    let _ = pool.release(session);
    println!("   Outstanding after late return: {}\n", pool.outstanding_count());
}

fn remove_while_borrowed() {
    println!("3. Remove While Borrowed:");
    let pool = Pool::new(PoolConfig::default().opened());
    let _ = pool.add(Session::new());

    let session = pool.acquire().unwrap();
    let id = session.id();
    let borrower = {
        let pool = pool.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(300));
            let _ = pool.release(session);
        })
    };

    println!("   Removing {} (currently out, this blocks)...", id);
    let removed = pool.remove(&Session::with_id(id));
    println!("   Removed: {}, pool size: {}", removed, pool.size());
    borrower.join().unwrap();
}
