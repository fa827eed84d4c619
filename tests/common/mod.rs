//! Shared domain models and rule sets used by the integration tests.
//!
//! The models are deliberately plain structs with hand-written
//! `Interceptable` implementations; rule sets are declared through the
//! fluent builder exactly the way a rule-set author would.

#![allow(dead_code)]

use cascade_rules::{
    AccessorCache, EngineError, EngineResult, Interceptable, RuleStore, RuleStoreBuilder, Value,
};
use std::sync::Arc;

fn int_of(type_name: &'static str, property: &str, value: &Value) -> EngineResult<i64> {
    value.as_int().ok_or_else(|| EngineError::TypeMismatch {
        type_name: type_name.to_string(),
        property: property.to_string(),
        expected: "integer",
        actual: value.kind(),
    })
}

fn float_of(type_name: &'static str, property: &str, value: &Value) -> EngineResult<f64> {
    value.as_float().ok_or_else(|| EngineError::TypeMismatch {
        type_name: type_name.to_string(),
        property: property.to_string(),
        expected: "float",
        actual: value.kind(),
    })
}

fn bool_of(type_name: &'static str, property: &str, value: &Value) -> EngineResult<bool> {
    value.as_bool().ok_or_else(|| EngineError::TypeMismatch {
        type_name: type_name.to_string(),
        property: property.to_string(),
        expected: "boolean",
        actual: value.kind(),
    })
}

fn opt_string_of(
    type_name: &'static str,
    property: &str,
    value: Value,
) -> EngineResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::Str(s) => Ok(Some(s)),
        other => Err(EngineError::TypeMismatch {
            type_name: type_name.to_string(),
            property: property.to_string(),
            expected: "string or null",
            actual: other.kind(),
        }),
    }
}

fn unknown(type_name: &'static str, property: &str) -> EngineError {
    EngineError::UnknownProperty {
        type_name: type_name.to_string(),
        property: property.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Bingo: ping-pong increments with a terminal message
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Bingo {
    pub x: i64,
    pub y: i64,
    pub message: Option<String>,
}

impl Interceptable for Bingo {
    fn type_name(&self) -> &'static str {
        "Bingo"
    }

    fn property_names(&self) -> &'static [&'static str] {
        &["x", "y", "message"]
    }

    fn get_value(&self, property: &str) -> Option<Value> {
        match property {
            "x" => Some(self.x.into()),
            "y" => Some(self.y.into()),
            "message" => Some(self.message.clone().into()),
            _ => None,
        }
    }

    fn set_value(&mut self, property: &str, value: Value) -> EngineResult<()> {
        match property {
            "x" => self.x = int_of("Bingo", property, &value)?,
            "y" => self.y = int_of("Bingo", property, &value)?,
            "message" => self.message = opt_string_of("Bingo", property, value)?,
            _ => return Err(unknown("Bingo", property)),
        }
        Ok(())
    }

    fn composite(&self, _: &str) -> Option<&dyn Interceptable> {
        None
    }

    fn composite_mut(&mut self, _: &str) -> Option<&mut dyn Interceptable> {
        None
    }
}

/// `x <- y + 1` while `x < 100`, `y <- x + 1` while `y < 100`, and a
/// terminal message once either side passes 100.
pub fn bingo_rules() -> EngineResult<RuleStoreBuilder<Bingo>> {
    let mut builder = RuleStore::<Bingo>::builder();

    builder
        .set("x")?
        .with_explain(|b| Value::from(b.y + 1), "y + 1")
        .when_explain(|b| b.x < 100, "x < 100")
        .on_changed(&["y"])?;

    builder
        .set("y")?
        .with_explain(|b| Value::from(b.x + 1), "x + 1")
        .when_explain(|b| b.y < 100, "y < 100")
        .on_changed(&["x"])?;

    builder
        .set("message")?
        .with_explain(|_| Value::from("BINGO"), "\"BINGO\"")
        .when_explain(|b| b.x >= 100 || b.y >= 100, "x >= 100 or y >= 100")
        .on_changed(&["x", "y"])?;

    Ok(builder)
}

// ---------------------------------------------------------------------------
// Abcd: a guarded ring
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Abcd {
    pub a: i64,
    pub b: i64,
    pub c: i64,
    pub d: i64,
}

impl Interceptable for Abcd {
    fn type_name(&self) -> &'static str {
        "Abcd"
    }

    fn property_names(&self) -> &'static [&'static str] {
        &["a", "b", "c", "d"]
    }

    fn get_value(&self, property: &str) -> Option<Value> {
        match property {
            "a" => Some(self.a.into()),
            "b" => Some(self.b.into()),
            "c" => Some(self.c.into()),
            "d" => Some(self.d.into()),
            _ => None,
        }
    }

    fn set_value(&mut self, property: &str, value: Value) -> EngineResult<()> {
        let slot = match property {
            "a" => &mut self.a,
            "b" => &mut self.b,
            "c" => &mut self.c,
            "d" => &mut self.d,
            _ => return Err(unknown("Abcd", property)),
        };
        *slot = int_of("Abcd", property, &value)?;
        Ok(())
    }

    fn composite(&self, _: &str) -> Option<&dyn Interceptable> {
        None
    }

    fn composite_mut(&mut self, _: &str) -> Option<&mut dyn Interceptable> {
        None
    }
}

/// The ring `b <- a`, `c <- b`, `d <- c`, `a <- d + 1`, each leg guarded
/// below 100. Terminates because the guards eventually block the ring.
pub fn abcd_rules() -> EngineResult<RuleStoreBuilder<Abcd>> {
    let mut builder = RuleStore::<Abcd>::builder();

    builder
        .set("b")?
        .with(|o| Value::from(o.a))
        .when(|o| o.a < 100)
        .on_changed(&["a"])?;

    builder
        .set("c")?
        .with(|o| Value::from(o.b))
        .when(|o| o.c < 100)
        .on_changed(&["b"])?;

    builder
        .set("d")?
        .with(|o| Value::from(o.c))
        .when(|o| o.d < 100)
        .on_changed(&["c"])?;

    builder
        .set("a")?
        .with(|o| Value::from(o.d + 1))
        .when(|o| o.a < 100)
        .on_changed(&["d"])?;

    Ok(builder)
}

// ---------------------------------------------------------------------------
// Xyz: unguarded doubling chain (idempotence fixture)
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Xyz {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Interceptable for Xyz {
    fn type_name(&self) -> &'static str {
        "Xyz"
    }

    fn property_names(&self) -> &'static [&'static str] {
        &["x", "y", "z"]
    }

    fn get_value(&self, property: &str) -> Option<Value> {
        match property {
            "x" => Some(self.x.into()),
            "y" => Some(self.y.into()),
            "z" => Some(self.z.into()),
            _ => None,
        }
    }

    fn set_value(&mut self, property: &str, value: Value) -> EngineResult<()> {
        let slot = match property {
            "x" => &mut self.x,
            "y" => &mut self.y,
            "z" => &mut self.z,
            _ => return Err(unknown("Xyz", property)),
        };
        *slot = int_of("Xyz", property, &value)?;
        Ok(())
    }

    fn composite(&self, _: &str) -> Option<&dyn Interceptable> {
        None
    }

    fn composite_mut(&mut self, _: &str) -> Option<&mut dyn Interceptable> {
        None
    }
}

/// `y <- x * 2`, `z <- y * 2`.
pub fn xyz_rules() -> EngineResult<RuleStoreBuilder<Xyz>> {
    let mut builder = RuleStore::<Xyz>::builder();

    builder
        .set("y")?
        .with(|o| Value::from(o.x * 2))
        .on_changed(&["x"])?;

    builder
        .set("z")?
        .with(|o| Value::from(o.y * 2))
        .on_changed(&["y"])?;

    Ok(builder)
}

// ---------------------------------------------------------------------------
// Dog: default-filling rules exercised through trigger_all
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Dog {
    pub name: String,
    pub age: i64,
    pub is_dangerous: bool,
    pub is_animal: bool,
    pub favorite_toy: Option<String>,
}

impl Interceptable for Dog {
    fn type_name(&self) -> &'static str {
        "Dog"
    }

    fn property_names(&self) -> &'static [&'static str] {
        &["name", "age", "is_dangerous", "is_animal", "favorite_toy"]
    }

    fn get_value(&self, property: &str) -> Option<Value> {
        match property {
            "name" => Some(self.name.clone().into()),
            "age" => Some(self.age.into()),
            "is_dangerous" => Some(self.is_dangerous.into()),
            "is_animal" => Some(self.is_animal.into()),
            "favorite_toy" => Some(self.favorite_toy.clone().into()),
            _ => None,
        }
    }

    fn set_value(&mut self, property: &str, value: Value) -> EngineResult<()> {
        match property {
            "name" => {
                self.name = value
                    .as_str()
                    .ok_or_else(|| EngineError::TypeMismatch {
                        type_name: "Dog".to_string(),
                        property: property.to_string(),
                        expected: "string",
                        actual: value.kind(),
                    })?
                    .to_string()
            }
            "age" => self.age = int_of("Dog", property, &value)?,
            "is_dangerous" => self.is_dangerous = bool_of("Dog", property, &value)?,
            "is_animal" => self.is_animal = bool_of("Dog", property, &value)?,
            "favorite_toy" => self.favorite_toy = opt_string_of("Dog", property, value)?,
            _ => return Err(unknown("Dog", property)),
        }
        Ok(())
    }

    fn composite(&self, _: &str) -> Option<&dyn Interceptable> {
        None
    }

    fn composite_mut(&mut self, _: &str) -> Option<&mut dyn Interceptable> {
        None
    }
}

fn favorite_toy_default() -> &'static str {
    "ball"
}

pub fn dog_rules() -> EngineResult<RuleStoreBuilder<Dog>> {
    let mut builder = RuleStore::<Dog>::builder();

    builder
        .set("is_animal")?
        .with(|_| Value::from(true))
        .on_changed(&["is_animal"])?;

    builder
        .set("name")?
        .with(|d| Value::from(format!("mr. {}", d.name)))
        .when(|d| d.name != "Clara" && !d.name.starts_with("mr."))
        .on_changed(&["name"])?;

    builder
        .set("is_dangerous")?
        .with(|d| Value::from(d.age > 3 && d.name != "Fluffy"))
        .on_changed(&["age"])?;

    builder
        .set("favorite_toy")?
        .with(|_| Value::from(favorite_toy_default()))
        .when(|d| d.favorite_toy.is_none())
        .on_changed(&["favorite_toy"])?;

    Ok(builder)
}

// ---------------------------------------------------------------------------
// CdsTrade: composite object graph with nested rule targets
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct CreditDefaultSwap {
    pub ref_entity: Option<String>,
    pub transaction_type: Option<String>,
    pub currency: Option<String>,
    pub restructuring: Option<String>,
    pub seniority: Option<String>,
    pub spread: f64,
    pub nominal: f64,
}

impl Interceptable for CreditDefaultSwap {
    fn type_name(&self) -> &'static str {
        "CreditDefaultSwap"
    }

    fn property_names(&self) -> &'static [&'static str] {
        &[
            "ref_entity",
            "transaction_type",
            "currency",
            "restructuring",
            "seniority",
            "spread",
            "nominal",
        ]
    }

    fn get_value(&self, property: &str) -> Option<Value> {
        match property {
            "ref_entity" => Some(self.ref_entity.clone().into()),
            "transaction_type" => Some(self.transaction_type.clone().into()),
            "currency" => Some(self.currency.clone().into()),
            "restructuring" => Some(self.restructuring.clone().into()),
            "seniority" => Some(self.seniority.clone().into()),
            "spread" => Some(self.spread.into()),
            "nominal" => Some(self.nominal.into()),
            _ => None,
        }
    }

    fn set_value(&mut self, property: &str, value: Value) -> EngineResult<()> {
        match property {
            "ref_entity" => self.ref_entity = opt_string_of("CreditDefaultSwap", property, value)?,
            "transaction_type" => {
                self.transaction_type = opt_string_of("CreditDefaultSwap", property, value)?
            }
            "currency" => self.currency = opt_string_of("CreditDefaultSwap", property, value)?,
            "restructuring" => {
                self.restructuring = opt_string_of("CreditDefaultSwap", property, value)?
            }
            "seniority" => self.seniority = opt_string_of("CreditDefaultSwap", property, value)?,
            "spread" => self.spread = float_of("CreditDefaultSwap", property, &value)?,
            "nominal" => self.nominal = float_of("CreditDefaultSwap", property, &value)?,
            _ => return Err(unknown("CreditDefaultSwap", property)),
        }
        Ok(())
    }

    fn composite(&self, _: &str) -> Option<&dyn Interceptable> {
        None
    }

    fn composite_mut(&mut self, _: &str) -> Option<&mut dyn Interceptable> {
        None
    }
}

#[derive(Debug, Default)]
pub struct CdsTrade {
    pub counterparty: Option<String>,
    pub counterparty_role: Option<String>,
    pub clearing_house: Option<String>,
    pub sales: Option<String>,
    pub sales_credit: f64,
    pub cds_product: CreditDefaultSwap,
}

impl Interceptable for CdsTrade {
    fn type_name(&self) -> &'static str {
        "CdsTrade"
    }

    fn property_names(&self) -> &'static [&'static str] {
        &[
            "counterparty",
            "counterparty_role",
            "clearing_house",
            "sales",
            "sales_credit",
            "cds_product",
        ]
    }

    fn get_value(&self, property: &str) -> Option<Value> {
        match property {
            "counterparty" => Some(self.counterparty.clone().into()),
            "counterparty_role" => Some(self.counterparty_role.clone().into()),
            "clearing_house" => Some(self.clearing_house.clone().into()),
            "sales" => Some(self.sales.clone().into()),
            "sales_credit" => Some(self.sales_credit.into()),
            _ => None,
        }
    }

    fn set_value(&mut self, property: &str, value: Value) -> EngineResult<()> {
        match property {
            "counterparty" => self.counterparty = opt_string_of("CdsTrade", property, value)?,
            "counterparty_role" => {
                self.counterparty_role = opt_string_of("CdsTrade", property, value)?
            }
            "clearing_house" => self.clearing_house = opt_string_of("CdsTrade", property, value)?,
            "sales" => self.sales = opt_string_of("CdsTrade", property, value)?,
            "sales_credit" => self.sales_credit = float_of("CdsTrade", property, &value)?,
            _ => return Err(unknown("CdsTrade", property)),
        }
        Ok(())
    }

    fn composite(&self, property: &str) -> Option<&dyn Interceptable> {
        match property {
            "cds_product" => Some(&self.cds_product),
            _ => None,
        }
    }

    fn composite_mut(&mut self, property: &str) -> Option<&mut dyn Interceptable> {
        match property {
            "cds_product" => Some(&mut self.cds_product),
            _ => None,
        }
    }
}

fn transaction_type(ref_entity: Option<&str>) -> Option<&'static str> {
    match ref_entity {
        Some("AXA") => Some("Standard European Corporate"),
        _ => None,
    }
}

fn default_currency(transaction_type: Option<&str>) -> Option<&'static str> {
    match transaction_type {
        Some("Standard European Corporate") => Some("EUR"),
        _ => None,
    }
}

fn default_restructuring(transaction_type: Option<&str>) -> Option<&'static str> {
    match transaction_type {
        Some("Standard European Corporate") => Some("MMR"),
        _ => None,
    }
}

fn default_seniority(transaction_type: Option<&str>) -> Option<&'static str> {
    match transaction_type {
        Some("Standard European Corporate") => Some("SNR"),
        _ => None,
    }
}

fn default_clearing_house(
    counterparty: Option<&str>,
    ref_entity: Option<&str>,
) -> Option<&'static str> {
    match (ref_entity, counterparty) {
        (Some("AXA"), Some("CHASEOTC")) => Some("ICEURO"),
        (Some("RENAULT"), Some("CHASEOTC")) => Some("ICETRUST"),
        _ => None,
    }
}

fn sales_credit(_spread: f64, _nominal: f64) -> f64 {
    4.0
}

/// The CDS field-defaulting rules, including nested targets and nested
/// trigger selectors.
pub fn cds_rules() -> EngineResult<RuleStoreBuilder<CdsTrade>> {
    let mut builder = RuleStore::<CdsTrade>::builder();

    builder
        .set("counterparty_role")?
        .with_explain(|_| Value::from("Client"), "\"Client\"")
        .when_explain(|t| t.sales.is_some(), "sales is set")
        .on_changed(&["sales"])?;

    builder
        .set("counterparty_role")?
        .with_explain(|_| Value::from("Dealer"), "\"Dealer\"")
        .when_explain(|t| t.sales.is_none(), "sales is not set")
        .on_changed(&["sales"])?;

    builder
        .set("clearing_house")?
        .with(|t| {
            Value::from(default_clearing_house(
                t.counterparty.as_deref(),
                t.cds_product.ref_entity.as_deref(),
            ))
        })
        .on_changed(&["cds_product.ref_entity", "counterparty"])?;

    builder
        .set("sales_credit")?
        .with(|t| Value::from(sales_credit(t.cds_product.spread, t.cds_product.nominal)))
        .on_changed(&["cds_product.spread", "cds_product.ref_entity"])?;

    builder
        .set("cds_product.transaction_type")?
        .with(|t| Value::from(transaction_type(t.cds_product.ref_entity.as_deref())))
        .on_changed(&["cds_product.ref_entity"])?;

    builder
        .set("cds_product.currency")?
        .with(|t| Value::from(default_currency(t.cds_product.transaction_type.as_deref())))
        .on_changed(&["cds_product.transaction_type"])?;

    builder
        .set("cds_product.restructuring")?
        .with(|t| {
            Value::from(default_restructuring(
                t.cds_product.transaction_type.as_deref(),
            ))
        })
        .on_changed(&["cds_product.transaction_type"])?;

    builder
        .set("cds_product.seniority")?
        .with(|t| {
            Value::from(default_seniority(
                t.cds_product.transaction_type.as_deref(),
            ))
        })
        .on_changed(&["cds_product.transaction_type"])?;

    Ok(builder)
}

/// Convenience: a fresh shared accessor cache.
pub fn cache() -> Arc<AccessorCache> {
    Arc::new(AccessorCache::new())
}

/// Route `tracing` output through the test harness capture.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
