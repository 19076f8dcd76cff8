pub mod competition;
pub mod health;
pub mod matches;
pub mod team;
pub mod validation;

// Calendar dates cross the API boundary as `YYYY-MM-DD`.
time::serde::format_description!(pub iso_date, Date, "[year]-[month]-[day]");
