//! Market-data fan-out demo
//!
//! A pinned producer publishes ticks at full rate while a consumer polls for
//! the newest coherent value. The consumer is allowed to skip ticks - the
//! channel overwrites - but every tick it does deliver must be internally
//! consistent and strictly newer than the previous one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use seqring::channel;
use seqring::cpu::pin_to_cpu;
use seqring::payload::Tick;

const CAPACITY: u64 = 1024;
const TOTAL_TICKS: u64 = 5_000_000;

fn main() {
    let (mut tx, mut rx) = channel::<Tick>(CAPACITY).expect("channel allocation");
    let done = Arc::new(AtomicBool::new(false));

    let start = Instant::now();

    let done_tx = done.clone();
    let producer = thread::spawn(move || {
        let _ = pin_to_cpu(0);
        for i in 0..TOTAL_TICKS {
            tx.write(Tick {
                price: 100_000 + i,
                qty: (i % 500) + 1,
                venue: (i % 8) as u32,
            });
        }
        done_tx.store(true, Ordering::Release);
        TOTAL_TICKS
    });

    let consumer = thread::spawn(move || {
        let _ = pin_to_cpu(1);
        let mut out = Tick::default();
        let mut delivered = 0u64;
        let mut stale_price_errors = 0u64;
        let mut last_price = 0u64;

        loop {
            if rx.try_read(&mut out) {
                if out.price <= last_price {
                    stale_price_errors += 1;
                }
                last_price = out.price;
                delivered += 1;
            } else if done.load(Ordering::Acquire) {
                while rx.try_read(&mut out) {
                    if out.price <= last_price {
                        stale_price_errors += 1;
                    }
                    last_price = out.price;
                    delivered += 1;
                }
                break;
            } else {
                std::hint::spin_loop();
            }
        }

        (delivered, last_price, stale_price_errors)
    });

    let produced = producer.join().unwrap();
    let (delivered, last_price, stale_price_errors) = consumer.join().unwrap();
    let elapsed = start.elapsed();

    let skipped = produced - delivered;
    let rate = produced as f64 / elapsed.as_secs_f64();

    println!("\n=== Market Feed Demo ===");
    println!("Capacity:        {}", CAPACITY);
    println!("Produced:        {}", produced);
    println!("Delivered:       {}", delivered);
    println!("Skipped:         {} ({:.2}%)", skipped, (skipped as f64 / produced as f64) * 100.0);
    println!("Last price seen: {}", last_price);
    println!("Produce rate:    {:.2} M ticks/s", rate / 1_000_000.0);
    println!("Elapsed:         {:.3}s", elapsed.as_secs_f64());

    if stale_price_errors == 0 && delivered > 0 {
        println!("\nPASSED: every delivered tick was strictly newer than the previous one");
    } else {
        println!("\nFAILED: {} stale deliveries, last price {}", stale_price_errors, last_price);
        std::process::exit(1);
    }
}
