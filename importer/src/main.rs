fn main() -> anyhow::Result<()> {
    importer::run()
}
