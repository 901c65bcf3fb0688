use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod parsed;

use parsed::ParsedStruct;

/// Implements `tagmock_core::Mockable` for a struct.
///
/// Named fields take part in generation when they carry a tag for the
/// mocker's marker:
///
/// ```ignore
/// #[derive(Default, Mockable)]
/// struct Order {
///     #[tag(mock = "key=integer,gte=1")]
///     id: u64,
/// }
/// ```
///
/// Untagged fields are never touched. Assigning `Value::Zero` or
/// `Value::Allocate` resets every tagged field to its zero value. Type
/// parameters must be `'static` and tagged field types `Mockable`.
///
/// A tuple struct with a single field is transparent and behaves like the
/// wrapped type.
#[proc_macro_derive(Mockable, attributes(tag))]
pub fn derive_mockable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match ParsedStruct::from_input(&input) {
        Ok(parsed) => parsed.emit().into(),
        Err(err) => err.to_compile_error().into(),
    }
}
