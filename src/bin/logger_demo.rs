use cartola_session::logger::*;

fn main() -> anyhow::Result<()> {
    let logger = Logger::new_bootstrap();
    trace!("bootstrap trace log");
    debug!("bootstrap debug log");
    info!("bootstrap info log");

    let config = LogConfig {
        filter: "cartola_session=trace,debug".to_string(),
    };
    logger.reload_from_config(&config)?;
    trace!("application trace log");
    debug!("application debug log");
    info!("application info log");

    // an invalid directive is rejected and the previous filter stays active
    let bad = LogConfig {
        filter: "cartola_session=loud".to_string(),
    };
    println!("invalid filter rejected: {}", logger.reload_from_config(&bad).is_err());
    debug!("still at debug");

    Ok(())
}
