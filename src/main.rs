use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use mlfq_model::{Job, MlfqConfig, ProcessType, Report, Sim, sim::demo_jobs};
use rand::prelude::*;

/// mlfq_model: tick-level model of a three-tier multi-level feedback queue
///
/// Real-time processes land on Q0 and are served by base priority with
/// preemption. Interactive processes land on Q1 and share the CPU round robin;
/// a process that uses its whole quantum drops to Q2. Batch processes land on
/// Q2 and run first come, first served. Processes left waiting on Q1/Q2 for
/// the aging threshold move up one tier.
///
/// Without --workload or --random the stock six-process mix is simulated.
#[derive(Debug, Parser)]
struct Opts {
    /// Ticks a Q1 process may run before it is demoted to Q2.
    #[clap(short = 'q', long, default_value = "3")]
    rr_quantum: u64,

    /// Ticks a Q1/Q2 process may wait before it is promoted one tier.
    #[clap(short = 'a', long, default_value = "8")]
    aging_threshold: u64,

    /// JSON file with an array of {pid, arrival, burst, base_priority, ptype}.
    #[clap(short = 'w', long, conflicts_with = "random")]
    workload: Option<PathBuf>,

    /// Generate a seeded random workload with arrivals spread over this many
    /// ticks.
    #[clap(short = 'r', long)]
    random: Option<u64>,

    /// Seed for --random.
    #[clap(long, default_value = "0")]
    seed: u64,

    /// Per-tick arrival probability for --random.
    #[clap(long, default_value = "0.3")]
    p_arrival: f64,

    /// Print the report as JSON.
    #[clap(long, action = clap::ArgAction::SetTrue)]
    json: bool,

    /// Print every scheduling event as it happens.
    #[clap(short = 't', long, action = clap::ArgAction::SetTrue)]
    trace: bool,

    /// Enable verbose output. Specify multiple times to increase verbosity.
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    let llv = match opts.verbose {
        0 => simplelog::LevelFilter::Info,
        1 => simplelog::LevelFilter::Debug,
        _ => simplelog::LevelFilter::Trace,
    };
    let mut lcfg = simplelog::ConfigBuilder::new();
    lcfg.set_time_level(simplelog::LevelFilter::Error)
        .set_location_level(simplelog::LevelFilter::Off)
        .set_target_level(simplelog::LevelFilter::Off)
        .set_thread_level(simplelog::LevelFilter::Off);
    simplelog::TermLogger::init(
        llv,
        lcfg.build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let jobs = match (&opts.workload, opts.random) {
        (Some(path), _) => load_workload(path)?,
        (None, Some(ticks)) => {
            info!(
                "Generating random workload over {ticks} ticks, seed={}",
                opts.seed
            );
            bernoulli_jobs(ticks, opts.p_arrival, 0.3, 2, 6, opts.seed)
        }
        (None, None) => demo_jobs(),
    };

    let config = MlfqConfig {
        rr_quantum: opts.rr_quantum,
        aging_threshold: opts.aging_threshold,
    };
    let mut sim = Sim::new(jobs, config).context("Invalid simulation input")?;

    let report = if opts.trace {
        sim.run_with(|now, events| {
            for event in events {
                println!("t={} {:?}", now, event);
            }
        })
    } else {
        sim.run()
    };

    if opts.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        print_report(&report);
    }

    Ok(())
}

fn load_workload(path: &Path) -> Result<Vec<Job>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read workload {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse workload {}", path.display()))
}

fn bernoulli_jobs(
    ticks: u64,
    p_arrival: f64,
    p_short: f64,
    short_ticks: u64,
    long_ticks: u64,
    seed: u64,
) -> Vec<Job> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut jobs = Vec::new();

    for t in 0..ticks {
        if rng.random::<f64>() < p_arrival {
            let burst = if rng.random::<f64>() < p_short {
                short_ticks
            } else {
                long_ticks
            };
            let ptype = match rng.random_range(0..3) {
                0 => ProcessType::Rt,
                1 => ProcessType::Interactive,
                _ => ProcessType::Batch,
            };
            let pid = format!("P{}", jobs.len() + 1);

            jobs.push(Job::new(&pid, t, burst, rng.random_range(0..10), ptype));
        }
    }

    jobs
}

fn print_report(report: &Report) {
    println!("\n===== MULTI-LEVEL CPU SCHEDULER REPORT =====");
    println!("Finish time: {}", report.finish_time);
    println!("CPU Utilization (%): {:.2}", report.cpu_utilization);
    println!("Throughput (proc/unit time): {:.4}", report.throughput);
    println!("Average Turnaround Time: {:.2}", report.avg_turnaround);
    println!("Average Waiting Time: {:.2}", report.avg_waiting);
    println!("Average Response Time: {:.2}", report.avg_response);
    println!(
        "Dispatches: {}  Preemptions: {}  Promotions: {}  Demotions: {}  Idle ticks: {}",
        report.stats.dispatches,
        report.stats.preemptions,
        report.stats.promotions,
        report.stats.demotions,
        report.stats.idle_ticks
    );

    println!("\nPID  Arr  Burst  Pri  Type         First  Comp  Resp  Wait  TAT");
    println!("----------------------------------------------------------------");
    for p in &report.processes {
        println!(
            "{:<4}{:<5}{:<7}{:<5}{:<13}{:<7}{:<6}{:<6}{:<6}{:<5}",
            p.pid,
            p.arrival,
            p.burst,
            p.base_priority,
            p.ptype,
            p.first_start,
            p.completion,
            p.response,
            p.waiting,
            p.turnaround
        );
    }
}
