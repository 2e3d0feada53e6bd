use log::error;
use recipes_etl::{Difficulty, RunReport};

fn print_report(report: &RunReport) {
    println!(
        "{} of {} recipes written to {}",
        report.records_written,
        report.records_loaded,
        report.output_path.display()
    );
    for difficulty in Difficulty::ALL {
        let count = report.count(difficulty);
        if count > 0 {
            println!("  {difficulty}: {count}");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match recipes_etl::run_from_config().await {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            error!("Job failed: {}", e);
            Err(e.into())
        }
    }
}
