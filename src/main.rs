fn main() -> anyhow::Result<()> {
    let code = skilltree_cli::run()?;
    std::process::exit(code);
}
