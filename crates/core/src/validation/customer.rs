use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::{integer_from_json, looks_like_email, non_negative, parse_date, ValidationErrors};
use crate::domain::customer::{Gender, NewCustomer};
use crate::domain::owner::OwnerId;

const MAX_AGE: i64 = 150;

/// Raw customer payload. JSON `null` counts as absent.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerInput {
    pub uid: Option<Value>,
    pub name: Option<Value>,
    pub email: Option<Value>,
    pub age: Option<Value>,
    pub gender: Option<Value>,
    pub last_visit: Option<Value>,
    pub total_visits: Option<Value>,
    pub latest_purchase: Option<Value>,
    pub total_purchase: Option<Value>,
}

impl CustomerInput {
    pub fn validate(&self, now: DateTime<Utc>) -> Result<NewCustomer, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let owner = present(&self.uid)
            .and_then(Value::as_str)
            .and_then(|raw| OwnerId::parse(raw).ok());
        if owner.is_none() {
            errors.push("uid", "Please login to add new customer");
        }

        let name = present(&self.name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        if name.is_none() {
            errors.push("name", "Customer name is required");
        }

        let email = present(&self.email)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|email| looks_like_email(email))
            .map(str::to_string);
        if email.is_none() {
            errors.push("email", "A valid email is required");
        }

        let age = present(&self.age)
            .and_then(integer_from_json)
            .filter(|age| (1..=MAX_AGE).contains(age))
            .and_then(|age| u32::try_from(age).ok());
        if age.is_none() {
            errors.push("age", "Age must be between 1 and 150");
        }

        let gender = match present(&self.gender) {
            None => {
                errors.push("gender", "Gender is required");
                None
            }
            Some(value) => {
                let parsed = value.as_str().and_then(|raw| raw.parse::<Gender>().ok());
                if parsed.is_none() {
                    errors.push("gender", "Gender must be 'male', 'female' or 'other'");
                }
                parsed
            }
        };

        let last_visit = match present(&self.last_visit) {
            None => {
                errors.push("lastVisit", "Last visit is required");
                None
            }
            Some(value) => match value.as_str().and_then(parse_date) {
                None => {
                    errors.push("lastVisit", "Last visit must be a valid date");
                    None
                }
                Some(at) if at > now => {
                    errors.push("lastVisit", "Last visit cannot be a future date");
                    None
                }
                Some(at) => Some(at),
            },
        };

        let total_visits = match present(&self.total_visits) {
            None => Some(0),
            Some(value) => {
                let parsed = integer_from_json(value).and_then(|n| u32::try_from(n).ok());
                if parsed.is_none() {
                    errors.push("totalVisits", "Total visits must be a non-negative number");
                }
                parsed
            }
        };

        let latest_purchase = present(&self.latest_purchase)
            .and_then(integer_from_json)
            .and_then(non_negative);
        if latest_purchase.is_none() {
            errors.push("latestPurchase", "Latest purchase amount must be a non-negative number");
        }

        let total_purchase = present(&self.total_purchase)
            .and_then(integer_from_json)
            .and_then(non_negative);
        if total_purchase.is_none() {
            errors.push("totalPurchase", "Total purchase amount must be a non-negative number");
        }

        match (
            owner,
            name,
            email,
            age,
            gender,
            last_visit,
            total_visits,
            latest_purchase,
            total_purchase,
        ) {
            (
                Some(owner),
                Some(name),
                Some(email),
                Some(age),
                Some(gender),
                Some(last_visit),
                Some(total_visits),
                Some(latest_purchase),
                Some(total_purchase),
            ) if errors.is_empty() => Ok(NewCustomer {
                owner,
                name,
                email,
                age,
                gender,
                last_visit,
                total_visits,
                latest_purchase,
                total_purchase,
            }),
            _ => Err(errors),
        }
    }
}

fn present(value: &Option<Value>) -> Option<&Value> {
    value.as_ref().filter(|value| !value.is_null())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::CustomerInput;
    use crate::domain::customer::Gender;

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().expect("now")
    }

    fn input(value: serde_json::Value) -> CustomerInput {
        serde_json::from_value(value).expect("customer input")
    }

    #[test]
    fn accepts_a_complete_payload_with_numeric_strings() {
        let customer = input(json!({
            "uid": "u1",
            "name": "Asha",
            "email": "asha@example.com",
            "age": "25",
            "gender": "female",
            "lastVisit": "2024-05-30",
            "totalVisits": 3,
            "latestPurchase": 100,
            "totalPurchase": "450"
        }))
        .validate(now())
        .expect("valid customer");

        assert_eq!(customer.owner.as_str(), "u1");
        assert_eq!(customer.age, 25);
        assert_eq!(customer.gender, Gender::Female);
        assert_eq!(customer.total_visits, 3);
        assert_eq!(customer.total_purchase, 450);
    }

    #[test]
    fn total_visits_defaults_to_zero() {
        let customer = input(json!({
            "uid": "u1",
            "name": "Ravi",
            "email": "ravi@example.com",
            "age": 40,
            "gender": "male",
            "lastVisit": "2024-05-30T08:00:00Z",
            "latestPurchase": 0,
            "totalPurchase": 0
        }))
        .validate(now())
        .expect("valid customer");

        assert_eq!(customer.total_visits, 0);
        assert_eq!(customer.latest_purchase, 0);
    }

    #[test]
    fn reports_every_invalid_field() {
        let errors = input(json!({
            "uid": "",
            "name": "  ",
            "email": "not-an-email",
            "age": 0,
            "gender": "unknown",
            "lastVisit": "yesterday",
            "totalVisits": -1,
            "latestPurchase": -5,
            "totalPurchase": "lots"
        }))
        .validate(now())
        .expect_err("invalid customer");

        let fields: Vec<&str> = errors.errors().iter().map(|error| error.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "uid",
                "name",
                "email",
                "age",
                "gender",
                "lastVisit",
                "totalVisits",
                "latestPurchase",
                "totalPurchase"
            ]
        );
    }

    #[test]
    fn rejects_future_last_visit_and_out_of_range_age() {
        let errors = input(json!({
            "uid": "u1",
            "name": "Asha",
            "email": "asha@example.com",
            "age": 151,
            "gender": "female",
            "lastVisit": "2024-06-02",
            "latestPurchase": 1,
            "totalPurchase": 1
        }))
        .validate(now())
        .expect_err("invalid customer");

        assert_eq!(errors.errors().len(), 2);
        assert!(errors.has_field("age"));
        assert_eq!(errors.errors()[1].message, "Last visit cannot be a future date");
    }

    #[test]
    fn missing_required_fields_are_named() {
        let errors = input(json!({ "uid": "u1", "gender": null })).validate(now()).expect_err("x");

        assert!(errors.has_field("name"));
        assert!(errors.has_field("gender"));
        assert!(errors.has_field("lastVisit"));
        assert!(errors.has_field("totalPurchase"));
        assert!(!errors.has_field("totalVisits"));
    }
}
