fn main() -> anyhow::Result<()> {
    quotebot::ui::io::run()
}
