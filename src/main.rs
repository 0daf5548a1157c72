fn main() {
    if let Err(err) = lapwatch_lib::run() {
        eprintln!("lapwatch: {err:#}");
        std::process::exit(1);
    }
}
