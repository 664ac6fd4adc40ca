fn main() {
    gcplint_cli::cli::main();
}
