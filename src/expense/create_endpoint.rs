//! Defines the endpoint for submitting an expense with an optional receipt.

use axum::{
    Extension, Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use time::Date;

use crate::{
    Error,
    database_id::CategoryId,
    expense::{
        Expense, ExpenseState, NewExpense, create_expense,
        receipt::{
            ReceiptUpload, map_multipart_error, read_receipt_field, remove_receipt, save_receipt,
        },
    },
    money::parse_amount,
    timezone::parse_date,
    user::User,
};

/// The fields of the expense form after they have been read and parsed.
#[derive(Debug, Default)]
struct ExpenseForm {
    category_id: Option<CategoryId>,
    amount: Option<f64>,
    description: String,
    remarks: String,
    expense_date: Option<Date>,
    has_gst: bool,
    receipt: Option<ReceiptUpload>,
}

async fn read_expense_form(mut multipart: Multipart) -> Result<ExpenseForm, Error> {
    let mut form = ExpenseForm::default();

    while let Some(field) = multipart.next_field().await.map_err(map_multipart_error)? {
        let name = field.name().unwrap_or_default().to_owned();

        if name == "receipt" {
            form.receipt = read_receipt_field(field).await?;
            continue;
        }

        let value = field.text().await.map_err(map_multipart_error)?;
        let value = value.trim();

        match name.as_str() {
            "categoryId" if !value.is_empty() => {
                let category_id = value
                    .parse()
                    .map_err(|_| Error::InvalidId(value.to_owned()))?;
                form.category_id = Some(category_id);
            }
            "amount" if !value.is_empty() => form.amount = Some(parse_amount(value)?),
            "description" => form.description = value.to_owned(),
            "remarks" => form.remarks = value.to_owned(),
            "expenseDate" if !value.is_empty() => form.expense_date = Some(parse_date(value)?),
            "hasGst" => form.has_gst = value == "true",
            _ => tracing::debug!("Ignoring expense form field \"{name}\""),
        }
    }

    Ok(form)
}

/// A route handler for submitting an expense, responds with the new expense.
///
/// The request is a multipart form with the fields `categoryId`, `amount`, `description`,
/// `remarks`, `expenseDate`, `hasGst` and an optional `receipt` file.
/// The total of the expense is deducted from the logged in user's cash.
pub async fn create_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(user): Extension<User>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Expense>), Error> {
    let form = read_expense_form(multipart).await?;

    let category_id = form.category_id.ok_or(Error::MissingField("category"))?;
    let amount = form.amount.ok_or(Error::MissingField("amount"))?;
    let expense_date = form.expense_date.ok_or(Error::MissingField("expense date"))?;
    if form.description.is_empty() {
        return Err(Error::MissingField("description"));
    }

    let receipt_url = match &form.receipt {
        Some(receipt) => Some(save_receipt(&state.upload_dir, receipt).await?),
        None => None,
    };

    let new_expense = NewExpense {
        user_id: user.id,
        category_id,
        amount,
        description: form.description,
        remarks: form.remarks,
        receipt_url: receipt_url.clone(),
        expense_date,
        has_gst: form.has_gst,
    };

    let result = {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        create_expense(new_expense, &connection)
    };

    match result {
        Ok(expense) => {
            tracing::info!(
                "User {} submitted expense {} for {:.2}",
                user.id,
                expense.id,
                expense.total()
            );
            Ok((StatusCode::CREATED, Json(expense)))
        }
        Err(error) => {
            if let Some(receipt_url) = receipt_url {
                remove_receipt(&state.upload_dir, &receipt_url).await;
            }
            Err(error)
        }
    }
}
