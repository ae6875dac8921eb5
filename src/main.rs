// This is just a binary wrapper - the actual library is in lib.rs
// Run examples with: cargo run --example basic

use respool::{Pool, PoolConfig, Poolable, ResourceId};

struct Connection {
    id: ResourceId,
}

impl Poolable for Connection {
    fn id(&self) -> ResourceId {
        self.id
    }
}

fn main() {
    println!("=== respool ===");
    println!("See demos/ directory for usage examples");
    println!("Run: cargo run --example basic");
    println!();

    println!("Quick Demo:");
    let pool = Pool::new(PoolConfig::default().opened());
    for _ in 0..3 {
        let _ = pool.add(Connection {
            id: ResourceId::new(),
        });
    }

    let conn = pool.acquire().expect("pool is open and seeded");
    println!("  Borrowed: {}", conn.id());
    let _ = pool.release(conn);
    println!("  Available after return: {}", pool.available_count());
}
