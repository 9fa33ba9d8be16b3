//! Request payload schemas.
//!
//! Payloads deserialize leniently (every field is raw JSON, unknown fields
//! ignored) and are then type-checked and validated in one pass so that every
//! violation is reported together. Successful validation yields the
//! normalized [`CreateProduct`] / [`UpdateProduct`] the service works with.
//!
//! Like Joi's default `convert` mode, numeric strings are accepted for
//! `price` and `"true"`/`"false"` for `inStock`.

use axum_helpers::{ValidatePayload, errors::validation_messages};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{CreateProduct, ProductCategory, UpdateProduct};

const CATEGORY_MESSAGE: &str = "\"category\" must be one of [electronics, kitchen, fashion, other]";

/// Body of `POST /api/products`
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[schema(value_type = String, example = "Espresso Machine", min_length = 3, max_length = 100)]
    pub name: Option<Value>,

    #[schema(value_type = String)]
    pub description: Option<Value>,

    #[schema(value_type = f64, example = 249.99)]
    pub price: Option<Value>,

    /// One of electronics, kitchen, fashion, other
    #[schema(value_type = ProductCategory, example = "kitchen")]
    pub category: Option<Value>,

    /// Defaults to `true`
    #[schema(value_type = Option<bool>)]
    pub in_stock: Option<Value>,
}

/// Body of `PUT /api/products/{id}`. Every field is optional.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[schema(value_type = Option<String>, min_length = 3, max_length = 100)]
    pub name: Option<Value>,

    /// `null` or `""` clears the description
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Value>,

    #[schema(value_type = Option<f64>)]
    pub price: Option<Value>,

    #[schema(value_type = Option<ProductCategory>)]
    pub category: Option<Value>,

    #[schema(value_type = Option<bool>)]
    pub in_stock: Option<Value>,
}

/// Keeps an explicit `null` as `Some(Value::Null)` instead of collapsing it
/// into an absent field.
fn deserialize_some<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Typed fields carrying the value rules, checked once the types are known.
#[derive(Debug, Default, Validate)]
struct ProductFields {
    #[validate(length(
        min = 3,
        max = 100,
        message = "\"name\" length must be between 3 and 100 characters"
    ))]
    name: Option<String>,

    #[validate(length(min = 1, message = "\"description\" is not allowed to be empty"))]
    description: Option<String>,

    #[validate(range(exclusive_min = 0.0, message = "\"price\" must be a positive number"))]
    price: Option<f64>,
}

fn check_rules(fields: &ProductFields) -> Vec<String> {
    fields
        .validate()
        .err()
        .map(|e| validation_messages(&e))
        .unwrap_or_default()
}

fn string_field(field: &str, value: Option<Value>, errors: &mut Vec<String>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        _ => {
            errors.push(format!("\"{field}\" must be a string"));
            None
        }
    }
}

fn number_field(field: &str, value: Option<Value>, errors: &mut Vec<String>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    };
    if number.is_none() {
        errors.push(format!("\"{field}\" must be a number"));
    }
    number
}

fn bool_field(field: &str, value: Option<Value>, errors: &mut Vec<String>) -> Option<bool> {
    let flag = match value? {
        Value::Bool(b) => Some(b),
        Value::String(s) if s == "true" => Some(true),
        Value::String(s) if s == "false" => Some(false),
        _ => None,
    };
    if flag.is_none() {
        errors.push(format!("\"{field}\" must be a boolean"));
    }
    flag
}

fn category_field(value: Option<Value>, errors: &mut Vec<String>) -> Option<ProductCategory> {
    let parsed = match value? {
        Value::String(s) => ProductCategory::from_str(&s).ok(),
        _ => None,
    };
    if parsed.is_none() {
        errors.push(CATEGORY_MESSAGE.to_string());
    }
    parsed
}

impl ValidatePayload for CreateProductPayload {
    type Validated = CreateProduct;

    fn validate_payload(self) -> Result<CreateProduct, Vec<String>> {
        let mut errors = Vec::new();

        let required = [
            ("name", &self.name),
            ("description", &self.description),
            ("price", &self.price),
            ("category", &self.category),
        ];
        for (field, value) in required {
            if value.is_none() {
                errors.push(format!("\"{field}\" is required"));
            }
        }

        let fields = ProductFields {
            name: string_field("name", self.name, &mut errors),
            description: string_field("description", self.description, &mut errors),
            price: number_field("price", self.price, &mut errors),
        };
        let category = category_field(self.category, &mut errors);
        let in_stock = bool_field("inStock", self.in_stock, &mut errors);
        errors.extend(check_rules(&fields));

        match (fields.name, fields.description, fields.price, category) {
            (Some(name), Some(description), Some(price), Some(category)) if errors.is_empty() => {
                Ok(CreateProduct {
                    name,
                    description,
                    price,
                    category,
                    in_stock: in_stock.unwrap_or(true),
                })
            }
            _ => Err(errors),
        }
    }
}

impl ValidatePayload for UpdateProductPayload {
    type Validated = UpdateProduct;

    fn validate_payload(self) -> Result<UpdateProduct, Vec<String>> {
        let mut errors = Vec::new();

        let description = match self.description {
            None => None,
            Some(Value::Null) => Some(None),
            raw => Some(string_field("description", raw, &mut errors)),
        };
        let fields = ProductFields {
            name: string_field("name", self.name, &mut errors),
            description: None,
            price: number_field("price", self.price, &mut errors),
        };
        let category = category_field(self.category, &mut errors);
        let in_stock = bool_field("inStock", self.in_stock, &mut errors);
        errors.extend(check_rules(&fields));

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(UpdateProduct {
            name: fields.name,
            description,
            price: fields.price,
            category,
            in_stock,
        })
    }
}
