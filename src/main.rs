use check_rss::app;
use check_rss::report::Status;

fn main() {
    let status = match app::run() {
        Ok(status) => status,
        Err(err) => {
            println!("UNKNOWN ERROR: {err:#}");
            Status::Unknown
        }
    };
    std::process::exit(status.exit_code());
}
