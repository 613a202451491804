fn main() {
    std::process::exit(ebeam_cli::cli::run_from_env());
}
