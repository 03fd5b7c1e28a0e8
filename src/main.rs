fn main() -> anyhow::Result<()> {
    attentrack_lib::run()
}
