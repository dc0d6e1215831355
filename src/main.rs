use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use splice_events::{read_adjacencies_path, EventMaker, EventTable};

/// Discover skipped-exon and mutually-exclusive-exon splicing events from
/// an exon/junction adjacency table.
#[derive(Parser, Debug)]
#[command(name = "splice-events")]
#[command(author, version, about)]
struct Cli {
    /// Adjacency table: exon<TAB>junction<TAB>direction (.tsv, optionally .gz)
    #[arg(long, short)]
    adjacencies: PathBuf,

    /// Output directory for se.tsv and mxe.tsv
    #[arg(long, short, default_value = ".")]
    out_dir: PathBuf,

    /// Number of worker threads
    #[arg(long, short, default_value_t = num_cpus::get())]
    threads: usize,
}

fn write_table(table: &EventTable, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating event table {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    table
        .write_tsv(&mut writer)
        .with_context(|| format!("writing event table {}", path.display()))?;
    info!("{} written to {}", table.splice_type, path.display());
    Ok(())
}

fn main() -> Result<()> {
    simple_logger::init_with_level(log::Level::Info)?;

    let cli = Cli::parse();

    rayon::ThreadPoolBuilder::new()
        .num_threads(cli.threads)
        .build_global()?;

    let rows = read_adjacencies_path(&cli.adjacencies)
        .with_context(|| format!("reading adjacencies from {}", cli.adjacencies.display()))?;
    info!("{} adjacency rows", rows.len());

    let maker = EventMaker::new(&rows).context("building adjacency graph")?;
    info!(
        "{} exons, {} items in the adjacency graph",
        maker.n_exons(),
        maker.items().len()
    );

    let se = maker.skipped_exon()?;
    println!("{se}");
    write_table(&se, &cli.out_dir.join("se.tsv"))?;

    let mxe = maker.mutually_exclusive_exon()?;
    println!("{mxe}");
    write_table(&mxe, &cli.out_dir.join("mxe.tsv"))?;

    Ok(())
}
