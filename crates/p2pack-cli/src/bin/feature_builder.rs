//! feature-builder - Write an Eclipse feature.xml descriptor

use clap::Parser;
use p2pack_cli::feature::{self, FeatureArgs};
use p2pack_cli::logging::init_logging;

fn main() -> anyhow::Result<()> {
    let args = FeatureArgs::parse();
    init_logging(args.verbose);

    feature::run(args)
}
