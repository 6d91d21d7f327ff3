use chrono::NaiveDate;

/// File name of an exported receipt: `recu_<registration>_<YYYY-MM-DD>.pdf`.
/// Characters outside `[A-Za-z0-9_-]` in the registration number become `_`.
pub fn receipt_filename(registration_number: &str, date: NaiveDate) -> String {
    let registration: String = registration_number
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let registration = if registration.is_empty() {
        "sans-matricule".to_string()
    } else {
        registration
    };
    format!("recu_{}_{}.pdf", registration, date.format("%Y-%m-%d"))
}
