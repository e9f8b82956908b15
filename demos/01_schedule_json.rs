/// json in, json out - the shape a transport layer would exchange
use emi_amortisation::{AmortisationEngine, CalculationRequest, EngineConfig};

const BODY: &str = r#"{
    "loanId": "VL-2024-0042",
    "principal": "650000",
    "interestRate": "9.15",
    "tenure": 48,
    "productType": "VEHICLE_LOAN",
    "amortisationMethod": "flat_rate",
    "startDate": "2024-03-31",
    "options": { "includePrepayments": false },
    "requestedBy": "dealer-portal"
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let engine = AmortisationEngine::new(EngineConfig::default())?;
    let request = CalculationRequest::from_json(BODY)?;

    match engine.calculate_now(&request) {
        Ok(schedule) => println!("{}", schedule.to_json_pretty()),
        Err(e) => {
            eprintln!("{} {}", e.status_code(), e);
            std::process::exit(1);
        }
    }

    Ok(())
}
