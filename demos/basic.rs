//! Basic usage examples for the resource pool

use respool::{Pool, PoolConfig, Poolable, ResourceId};

struct Connection {
    id: ResourceId,
    addr: &'static str,
}

impl Connection {
    fn new(addr: &'static str) -> Self {
        Self {
            id: ResourceId::new(),
            addr,
        }
    }
}

impl Poolable for Connection {
    fn id(&self) -> ResourceId {
        self.id
    }
}

fn main() {
    println!("=== respool - Basic Examples ===\n");

    // Example 1: Simple circulation
    simple_circulation();

    // Example 2: Try methods
    try_methods();

    // Example 3: Scoped borrows
    scoped_borrows();

    // Example 4: Membership
    membership();
}

fn simple_circulation() {
    println!("1. Simple Circulation:");
    let pool = Pool::new(PoolConfig::default().opened());
    let _ = pool.add(Connection::new("db-1:5432"));
    let _ = pool.add(Connection::new("db-2:5432"));

    let conn = pool.acquire().unwrap();
    println!("   Borrowed {} ({})", conn.id(), conn.addr);
    println!("   Outstanding: {}", pool.outstanding_count());
    let _ = pool.release(conn);

    println!("   Available after return: {}\n", pool.available_count());
}

fn try_methods() {
    println!("2. Try Methods:");
    let pool = Pool::new(PoolConfig::default().opened());
    let _ = pool.add(Connection::new("db-1:5432"));

    // Borrow the only resource
    let first = pool.try_acquire();
    assert!(first.is_some());
    println!("   First try: Success");

    // Try again while it is out
    let second = pool.try_acquire();
    assert!(second.is_none());
    println!("   Second try: None (nothing free)");

    let _ = pool.release(first.unwrap());

    let third = pool.try_acquire();
    assert!(third.is_some());
    println!("   Third try: Success\n");
}

fn scoped_borrows() {
    println!("3. Scoped Borrows:");
    let pool = Pool::new(PoolConfig::default().opened());
    let _ = pool.add(Connection::new("db-1:5432"));

    {
        let conn = pool.acquire_scoped().unwrap();
        println!("   Borrowed {} behind a guard", conn.id());
        // Returned automatically when the guard drops
    }

    println!("   Available after scope: {}\n", pool.available_count());
}

fn membership() {
    println!("4. Membership:");
    let pool = Pool::new(PoolConfig::default().opened());
    let conn = Connection::new("db-1:5432");
    let keep = Connection::new("db-2:5432");

    let _ = pool.add(keep);
    match pool.add(conn) {
        Ok(()) => println!("   Registered a connection"),
        Err(duplicate) => println!("   Duplicate rejected: {}", duplicate.id()),
    }
    println!("   Pool size: {}", pool.size());

    let retired = Connection::new("db-3:5432");
    println!("   Removing an unmanaged resource: {}", pool.remove_now(&retired));
    println!("   Pool size: {}", pool.size());
}
