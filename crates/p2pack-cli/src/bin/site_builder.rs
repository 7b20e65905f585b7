//! site-builder - Build a zipped Eclipse p2 update site

use clap::Parser;
use p2pack_cli::logging::init_logging;
use p2pack_cli::site::{self, SiteArgs};

fn main() {
    let args = SiteArgs::parse();
    init_logging(args.verbose);

    if let Err(err) = site::run(args) {
        std::process::exit(site::report_error(&err));
    }
}
