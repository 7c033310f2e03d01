//! Inventory records for the three categories
//!
//! Each category is a plain table. [`InventoryRecord`] describes one table
//! (name, search columns, export columns) and turns a client form into the
//! column values to write, so repositories and handlers stay generic.

use chrono::{DateTime, Utc};
use domain::{
    Category,
    money::{MoneyInput, parse_money},
    normalize,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sqlx::{FromRow, Postgres, QueryBuilder, postgres::PgRow};
use tracing::warn;

use crate::validation::{optional_text, quantity, required_text};

const NAME_MAX: usize = 120;
const STATUS_MAX: usize = 30;
const NOTE_MAX: usize = 2000;

/// A value ready to be bound into an INSERT or UPDATE
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    OptionalText(Option<String>),
    Integer(i32),
    Money(Decimal),
}

impl FieldValue {
    pub fn push_bind(self, builder: &mut QueryBuilder<'_, Postgres>) {
        match self {
            FieldValue::Text(value) => {
                builder.push_bind(value);
            }
            FieldValue::OptionalText(value) => {
                builder.push_bind(value);
            }
            FieldValue::Integer(value) => {
                builder.push_bind(value);
            }
            FieldValue::Money(value) => {
                builder.push_bind(value);
            }
        }
    }
}

/// Column name and value pairs produced from a form
pub type Fields = Vec<(&'static str, FieldValue)>;

/// A table of inventory records
pub trait InventoryRecord:
    for<'r> FromRow<'r, PgRow> + Serialize + Send + Sync + Unpin + 'static
{
    /// Payload accepted on create and update
    type Form: DeserializeOwned + Send + 'static;

    const CATEGORY: Category;
    const TABLE: &'static str;
    /// Columns matched by the `q` search
    const SEARCH_COLUMNS: &'static [&'static str];
    /// Column titles of the PDF export
    const EXPORT_HEADERS: &'static [&'static str];

    fn id(&self) -> i64;

    fn status(&self) -> &str;

    /// Cells of this record in the PDF export, one per header
    fn export_row(&self) -> Vec<String>;

    /// Validate a form and produce the columns to write
    fn into_fields(form: Self::Form) -> Result<Fields, String>;
}

fn status_field(raw: Option<&str>) -> Result<String, String> {
    let status = normalize(raw).to_string();

    if status.chars().count() > STATUS_MAX {
        return Err(format!(
            "Status must be at most {} characters long",
            STATUS_MAX
        ));
    }

    Ok(status)
}

fn stock_fields(
    name: &str,
    status: Option<&str>,
    expected: Option<i32>,
    available: Option<i32>,
    unavailable: Option<i32>,
) -> Result<Fields, String> {
    Ok(vec![
        ("nome", FieldValue::Text(required_text("Name", name, NAME_MAX)?)),
        ("situacao", FieldValue::Text(status_field(status)?)),
        (
            "qtd_prevista",
            FieldValue::Integer(quantity("qtd_prevista", expected)),
        ),
        ("qtd_disp", FieldValue::Integer(quantity("qtd_disp", available))),
        (
            "qtd_indisp",
            FieldValue::Integer(quantity("qtd_indisp", unavailable)),
        ),
    ])
}

fn optional(
    column: &'static str,
    label: &str,
    value: Option<String>,
    max: usize,
) -> Result<(&'static str, FieldValue), String> {
    Ok((column, FieldValue::OptionalText(optional_text(label, value, max)?)))
}

fn cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// CL2 stock item
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Cl2Item {
    pub id: i64,
    pub nome: String,
    pub situacao: String,
    pub qtd_prevista: i32,
    pub qtd_disp: i32,
    pub qtd_indisp: i32,
    pub criado_em: DateTime<Utc>,
    pub atualizado_em: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Cl2Form {
    pub nome: String,
    pub situacao: Option<String>,
    pub qtd_prevista: Option<i32>,
    pub qtd_disp: Option<i32>,
    pub qtd_indisp: Option<i32>,
}

impl InventoryRecord for Cl2Item {
    type Form = Cl2Form;

    const CATEGORY: Category = Category::Cl2;
    const TABLE: &'static str = "cl2";
    const SEARCH_COLUMNS: &'static [&'static str] = &["nome", "situacao"];
    const EXPORT_HEADERS: &'static [&'static str] = &[
        "ID",
        "Name",
        "Status",
        "Expected",
        "Available",
        "Unavailable",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn status(&self) -> &str {
        &self.situacao
    }

    fn export_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.nome.clone(),
            self.situacao.clone(),
            self.qtd_prevista.to_string(),
            self.qtd_disp.to_string(),
            self.qtd_indisp.to_string(),
        ]
    }

    fn into_fields(form: Cl2Form) -> Result<Fields, String> {
        stock_fields(
            &form.nome,
            form.situacao.as_deref(),
            form.qtd_prevista,
            form.qtd_disp,
            form.qtd_indisp,
        )
    }
}

/// CL6 stock item with value and identification data
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Cl6Item {
    pub id: i64,
    pub nome: String,
    pub situacao: String,
    pub qtd_prevista: i32,
    pub qtd_disp: i32,
    pub qtd_indisp: i32,
    pub valor: Decimal,
    pub observacao: Option<String>,
    pub numero_serie: Option<String>,
    pub numero_patrimonio: Option<String>,
    pub modelo: Option<String>,
    pub marca: Option<String>,
    pub criado_em: DateTime<Utc>,
    pub atualizado_em: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Cl6Form {
    pub nome: String,
    pub situacao: Option<String>,
    pub qtd_prevista: Option<i32>,
    pub qtd_disp: Option<i32>,
    pub qtd_indisp: Option<i32>,
    pub valor: Option<MoneyInput>,
    pub observacao: Option<String>,
    pub numero_serie: Option<String>,
    pub numero_patrimonio: Option<String>,
    pub modelo: Option<String>,
    pub marca: Option<String>,
}

impl InventoryRecord for Cl6Item {
    type Form = Cl6Form;

    const CATEGORY: Category = Category::Cl6;
    const TABLE: &'static str = "cl6";
    const SEARCH_COLUMNS: &'static [&'static str] = &[
        "nome",
        "situacao",
        "numero_patrimonio",
        "numero_serie",
        "marca",
        "modelo",
    ];
    const EXPORT_HEADERS: &'static [&'static str] = &[
        "ID",
        "Name",
        "Status",
        "Expected",
        "Available",
        "Unavailable",
        "Value",
        "Asset no.",
        "Serial no.",
        "Brand",
        "Model",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn status(&self) -> &str {
        &self.situacao
    }

    fn export_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.nome.clone(),
            self.situacao.clone(),
            self.qtd_prevista.to_string(),
            self.qtd_disp.to_string(),
            self.qtd_indisp.to_string(),
            format!("{:.2}", self.valor),
            cell(&self.numero_patrimonio),
            cell(&self.numero_serie),
            cell(&self.marca),
            cell(&self.modelo),
        ]
    }

    fn into_fields(form: Cl6Form) -> Result<Fields, String> {
        let mut fields = stock_fields(
            &form.nome,
            form.situacao.as_deref(),
            form.qtd_prevista,
            form.qtd_disp,
            form.qtd_indisp,
        )?;

        let valor = parse_money(form.valor.as_ref());
        if valor.fell_back {
            warn!("Unusable value {:?} for CL6 item replaced with 0", form.valor);
        }

        fields.push(("valor", FieldValue::Money(valor.value)));
        fields.push(optional("observacao", "Note", form.observacao, NOTE_MAX)?);
        fields.push(optional(
            "numero_serie",
            "Serial number",
            form.numero_serie,
            NAME_MAX,
        )?);
        fields.push(optional(
            "numero_patrimonio",
            "Asset number",
            form.numero_patrimonio,
            NAME_MAX,
        )?);
        fields.push(optional("modelo", "Model", form.modelo, NAME_MAX)?);
        fields.push(optional("marca", "Brand", form.marca, NAME_MAX)?);

        Ok(fields)
    }
}

/// CL7 individually tracked material
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Cl7Item {
    pub id: i64,
    pub material: String,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub numero_serie: Option<String>,
    pub situacao: String,
    pub observacao: Option<String>,
    pub criado_em: DateTime<Utc>,
    pub atualizado_em: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Cl7Form {
    pub material: String,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub numero_serie: Option<String>,
    pub situacao: Option<String>,
    pub observacao: Option<String>,
}

impl InventoryRecord for Cl7Item {
    type Form = Cl7Form;

    const CATEGORY: Category = Category::Cl7;
    const TABLE: &'static str = "cl7";
    const SEARCH_COLUMNS: &'static [&'static str] =
        &["material", "situacao", "marca", "modelo", "numero_serie"];
    const EXPORT_HEADERS: &'static [&'static str] =
        &["ID", "Material", "Brand", "Model", "Serial no.", "Status"];

    fn id(&self) -> i64 {
        self.id
    }

    fn status(&self) -> &str {
        &self.situacao
    }

    fn export_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.material.clone(),
            cell(&self.marca),
            cell(&self.modelo),
            cell(&self.numero_serie),
            self.situacao.clone(),
        ]
    }

    fn into_fields(form: Cl7Form) -> Result<Fields, String> {
        Ok(vec![
            (
                "material",
                FieldValue::Text(required_text("Material", &form.material, NAME_MAX)?),
            ),
            optional("marca", "Brand", form.marca, NAME_MAX)?,
            optional("modelo", "Model", form.modelo, NAME_MAX)?,
            optional("numero_serie", "Serial number", form.numero_serie, NAME_MAX)?,
            (
                "situacao",
                FieldValue::Text(status_field(form.situacao.as_deref())?),
            ),
            optional("observacao", "Note", form.observacao, NOTE_MAX)?,
        ])
    }
}
