fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match prefview_core::runtime::parse_cli_args(&args) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("[prefview-core] {error}");
            std::process::exit(2);
        }
    };

    if let Err(error) = prefview_core::runtime::run_with_options(options) {
        prefview_core::logging::error(&format!("command failed: {error}"));
        eprintln!("[prefview-core] {error}");
        std::process::exit(1);
    }
}
