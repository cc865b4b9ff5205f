fn main() {
    #[cfg(feature = "cli")]
    tagfile::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("tagfile: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
