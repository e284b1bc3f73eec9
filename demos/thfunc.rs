use clap::Parser;

use bdd_mgr::{BddMgr, Level, MgrConfig};

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Number of variables.
    #[arg(value_name = "INT", default_value = "16")]
    n: u32,

    /// Threshold: at least `k` variables must be true.
    #[arg(value_name = "INT", default_value = "8")]
    k: u32,

    /// Node limit (in bits, so the actual limit is `2^bits` nodes).
    #[clap(long, value_name = "INT", default_value = "24")]
    max_nodes: u32,

    /// Disable garbage collection.
    #[clap(long)]
    no_gc: bool,

    /// Reverse the variable order by adjacent swaps after building.
    #[clap(long)]
    reverse: bool,

    /// Print the diagram in DOT format.
    #[clap(long)]
    dot: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);

    let config = MgrConfig::default()
        .with_name("thfunc")
        .with_max_nodes(1usize << args.max_nodes.min(30))
        .with_gc(!args.no_gc)
        .with_dvo(args.reverse);
    let mgr = BddMgr::new(config);
    println!("mgr = {:?}", mgr);

    let time_build = std::time::Instant::now();
    let f = mgr.make_thfunc(args.n, args.k);
    f.check()?;
    println!("Built th({}, {}) in {:.3} s", args.n, args.k, time_build.elapsed().as_secs_f64());

    println!("size = {}", f.size());
    println!("minterms = {}", f.minterm_count(args.n));
    println!("shortest onepath = {:?} positive literals", f.shortest_onepath_len());
    println!("onepath = {}", f.onepath().to_bracket_string());

    if args.reverse {
        let time_reorder = std::time::Instant::now();
        let n = mgr.max_level();
        for i in 0..n {
            for level in 0..n.saturating_sub(i + 1) {
                mgr.swap_levels(Level::new(level))?;
            }
        }
        println!(
            "Reversed order in {:.3} s: {:?}",
            time_reorder.elapsed().as_secs_f64(),
            mgr.var_list()
        );
        println!("size = {}", f.size());
    }

    if args.dot {
        println!("{}", mgr.to_dot(&[&f])?);
    }

    mgr.gc(true);
    println!("mgr = {:?}", mgr);
    println!("garbage = {}, avail = {}", mgr.garbage_num(), mgr.avail_num());
    println!("used memory = {} bytes", mgr.used_mem());
    println!("cache: {:?}", mgr.cache_stats());

    println!("\nAll done in {:.3} s", time_total.elapsed().as_secs_f64());
    Ok(())
}
