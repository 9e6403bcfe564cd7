#[tokio::main]
async fn main() -> student_records::Result<()> {
    student_records::app::run().await
}
