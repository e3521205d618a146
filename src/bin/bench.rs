//! Codec benchmark binary.
//!
//! Measures size, marshal and unmarshal of a three-transaction signed block
//! under both strategies.
//! Run with: `cargo run --release --bin bench`

use std::hint::black_box;
use std::time::{Duration, Instant};

use ledger_codec::codec::Codec;
use ledger_codec::config::log_level_from_env;
use ledger_codec::core::block::{Block, BlockBody, BlockHeader, SignedBlock};
use ledger_codec::core::transaction::{Transaction, TransactionOutput};
use ledger_codec::types::address::{ADDRESS_KEY_LEN, Address};
use ledger_codec::types::hash::{HASH_LEN, Hash};
use ledger_codec::types::signature::{SIG_LEN, Sig};
use ledger_codec::types::strategy::{FixedWidth, Strategy, Varint};
use ledger_codec::utils::log::set_min_level;
use ledger_codec::{error, info};

// ---------------------------------------------------------------------------
// Benchmark harness
// ---------------------------------------------------------------------------

struct BenchResult {
    name: String,
    iterations: u64,
    total: Duration,
    bytes: usize,
}

impl BenchResult {
    fn avg(&self) -> Duration {
        self.total / self.iterations.max(1) as u32
    }

    fn print(&self) {
        let ns_per_op = self.avg().as_nanos();
        let mb_per_sec = if ns_per_op == 0 {
            0.0
        } else {
            self.bytes as f64 * 1000.0 / ns_per_op as f64
        };
        println!(
            "  {:<30} {:>9} iters {:>10.3} us/iter {:>7} bytes {:>9.1} MB/s",
            self.name,
            self.iterations,
            ns_per_op as f64 / 1000.0,
            self.bytes,
            mb_per_sec,
        );
    }
}

/// Runs `f` for at least `min_duration`. `f` returns the number of bytes it processed.
fn bench<F>(name: String, min_duration: Duration, mut f: F) -> BenchResult
where
    F: FnMut() -> usize,
{
    // Warmup
    for _ in 0..16 {
        f();
    }

    let mut iterations = 0u64;
    let mut bytes = 0usize;
    let start = Instant::now();
    while start.elapsed() < min_duration {
        bytes = f();
        iterations += 1;
    }

    BenchResult {
        name,
        iterations,
        total: start.elapsed(),
        bytes,
    }
}

// ---------------------------------------------------------------------------
// Workload
// ---------------------------------------------------------------------------

fn patterned<const N: usize>(seed: u8) -> [u8; N] {
    let mut out = [0u8; N];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = seed.wrapping_mul(31).wrapping_add(i as u8);
    }
    out
}

fn transaction(seed: u8) -> Transaction {
    Transaction {
        length: 43_214_321,
        tx_type: seed % 2,
        inner_hash: Hash(patterned::<HASH_LEN>(seed)),
        sigs: (0..3).map(|i| Sig(patterned::<SIG_LEN>(seed + i))).collect(),
        inputs: (0..3).map(|i| Hash(patterned::<HASH_LEN>(seed + 10 + i))).collect(),
        outputs: (0..3u8)
            .map(|i| TransactionOutput {
                address: Address::new(0, [seed.wrapping_add(i); ADDRESS_KEY_LEN]),
                coins: 987_987_987 * (i as u64 + 1),
                hours: 321_321 + i as u64,
            })
            .collect(),
    }
}

fn sample_block() -> SignedBlock {
    SignedBlock {
        sig: Sig(patterned::<SIG_LEN>(7)),
        block: Block {
            head: BlockHeader {
                version: 1,
                time: 1_538_036_613,
                block_seq: 9_999_999_999,
                fee: 1_234_123_412_341_234,
                prev_hash: Hash(patterned::<HASH_LEN>(1)),
                body_hash: Hash(patterned::<HASH_LEN>(2)),
                ux_hash: Hash(patterned::<HASH_LEN>(3)),
            },
            body: BlockBody {
                transactions: (0..3).map(|i| transaction(i * 40)).collect(),
            },
        },
    }
}

fn run_strategy<S: Strategy>(block: &SignedBlock, min: Duration) -> bool {
    let codec = Codec::<S>::from_env();
    let encoded = match codec.marshal(block, None) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("{} marshal failed: {e}", S::NAME);
            return false;
        }
    };
    match codec.from_bytes::<SignedBlock>(&encoded) {
        Ok(decoded) if &decoded == block => {}
        Ok(_) => {
            error!("{} round trip produced a different block", S::NAME);
            return false;
        }
        Err(e) => {
            error!("{} unmarshal failed: {e}", S::NAME);
            return false;
        }
    }

    bench(format!("{}/size", S::NAME), min, || {
        black_box(codec.size(black_box(block))) as usize
    })
    .print();

    let mut buf = Some(Vec::with_capacity(encoded.len()));
    bench(format!("{}/marshal", S::NAME), min, || {
        let out = codec
            .marshal(black_box(block), buf.take())
            .unwrap_or_default();
        let len = out.len();
        buf = Some(out);
        len
    })
    .print();

    bench(format!("{}/unmarshal", S::NAME), min, || {
        codec
            .unmarshal::<SignedBlock>(black_box(&encoded))
            .map(|(_, consumed)| consumed)
            .unwrap_or(0)
    })
    .print();

    let mut reused = SignedBlock::default();
    bench(format!("{}/unmarshal_into", S::NAME), min, || {
        codec
            .unmarshal_into(&mut reused, black_box(&encoded))
            .unwrap_or(0)
    })
    .print();

    true
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    if let Some(level) = log_level_from_env() {
        set_min_level(level);
    }
    let min = Duration::from_secs(2);
    let block = sample_block();

    info!(
        "Encoded block: {} bytes fixed-width, {} bytes varint",
        Codec::<FixedWidth>::new().size(&block),
        Codec::<Varint>::new().size(&block)
    );

    println!("Codec Benchmarks (each runs for >= 2s)\n");
    println!(
        "  {:<30} {:>9}       {:>14} {:>13} {:>14}",
        "benchmark", "iters", "avg time", "encoded", "throughput"
    );
    println!("  {}", "-".repeat(88));

    let ok = run_strategy::<FixedWidth>(&block, min) & run_strategy::<Varint>(&block, min);

    println!();
    if !ok {
        std::process::exit(1);
    }
}
