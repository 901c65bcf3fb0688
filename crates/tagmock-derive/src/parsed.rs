use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Data, DeriveInput, Error, Field, Fields, Generics, Ident, LitStr, Result, Type, parse_quote,
};

pub(crate) struct ParsedStruct {
    name: Ident,
    generics: Generics,
    body: Body,
}

enum Body {
    Named(Vec<ParsedField>),
    Transparent(Type),
}

struct ParsedField {
    index: usize,
    ident: Ident,
    ty: Type,
    tags: Vec<(String, String)>,
}

impl ParsedStruct {
    pub(crate) fn from_input(input: &DeriveInput) -> Result<Self> {
        let Data::Struct(data) = &input.data else {
            return Err(Error::new(
                input.ident.span(),
                "Mockable can only be derived for structs",
            ));
        };

        let body = match &data.fields {
            Fields::Named(named) => {
                let mut fields = Vec::new();
                for (index, field) in named.named.iter().enumerate() {
                    if let Some(parsed) = ParsedField::from_field(index, field)? {
                        fields.push(parsed);
                    }
                }
                Body::Named(fields)
            }
            Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
                Body::Transparent(unnamed.unnamed[0].ty.clone())
            }
            Fields::Unit => Body::Named(Vec::new()),
            Fields::Unnamed(_) => {
                return Err(Error::new(
                    input.ident.span(),
                    "Mockable tuple structs must have exactly one field",
                ));
            }
        };

        Ok(Self {
            name: input.ident.clone(),
            generics: input.generics.clone(),
            body,
        })
    }

    pub(crate) fn emit(&self) -> TokenStream2 {
        match &self.body {
            Body::Named(fields) => self.emit_named(fields),
            Body::Transparent(inner) => self.emit_transparent(inner),
        }
    }

    /// Type parameters must be `'static`; the given field types must be `Mockable`.
    fn bounded_generics<'a>(&self, field_types: impl Iterator<Item = &'a Type>) -> Generics {
        let mut generics = self.generics.clone();
        let params: Vec<Ident> = generics
            .type_params()
            .map(|param| param.ident.clone())
            .collect();
        let where_clause = generics.make_where_clause();
        for param in params {
            where_clause.predicates.push(parse_quote! { #param: 'static });
        }
        for ty in field_types {
            where_clause
                .predicates
                .push(parse_quote! { #ty: ::tagmock_core::Mockable });
        }
        generics
    }

    fn emit_named(&self, fields: &[ParsedField]) -> TokenStream2 {
        let name = &self.name;
        let generics = self.bounded_generics(fields.iter().map(|field| &field.ty));
        let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

        let infos = fields.iter().map(|field| {
            let index = field.index;
            let field_name = field.ident.to_string();
            let ty = &field.ty;
            let tags = field
                .tags
                .iter()
                .map(|(marker, raw)| quote! { (#marker, #raw) });
            quote! {
                ::tagmock_core::FieldInfo {
                    index: #index,
                    name: #field_name,
                    tags: &[#(#tags),*],
                    ty: <#ty as ::tagmock_core::Mockable>::type_info,
                }
            }
        });

        let resets = fields.iter().map(|field| {
            let ident = &field.ident;
            quote! {
                ::tagmock_core::Mockable::assign(&mut self.#ident, ::tagmock_core::Value::Zero)?;
            }
        });

        let arms = fields.iter().map(|field| {
            let index = field.index;
            let ident = &field.ident;
            quote! {
                #index => ::core::option::Option::Some(&mut self.#ident as &mut dyn ::tagmock_core::Mockable)
            }
        });

        quote! {
            impl #impl_generics ::tagmock_core::Mockable for #name #ty_generics #where_clause {
                fn type_info() -> ::tagmock_core::TypeInfo {
                    ::tagmock_core::TypeInfo::of::<Self>(::tagmock_core::Shape::Struct(|| {
                        ::std::vec![#(#infos),*]
                    }))
                }

                fn assign(
                    &mut self,
                    value: ::tagmock_core::Value,
                ) -> ::core::result::Result<(), ::tagmock_core::AssignError> {
                    match value.downcast::<Self>() {
                        ::core::result::Result::Ok(value) => {
                            *self = value;
                            ::core::result::Result::Ok(())
                        }
                        ::core::result::Result::Err(
                            ::tagmock_core::Value::Zero | ::tagmock_core::Value::Allocate,
                        ) => {
                            #(#resets)*
                            ::core::result::Result::Ok(())
                        }
                        ::core::result::Result::Err(other) => ::core::result::Result::Err(
                            ::tagmock_core::AssignError::mismatch(::core::any::type_name::<Self>(), &other),
                        ),
                    }
                }

                fn field_mut(
                    &mut self,
                    index: usize,
                ) -> ::core::option::Option<&mut dyn ::tagmock_core::Mockable> {
                    match index {
                        #(#arms,)*
                        _ => ::core::option::Option::None,
                    }
                }
            }
        }
    }

    fn emit_transparent(&self, inner: &Type) -> TokenStream2 {
        let name = &self.name;
        let generics = self.bounded_generics(std::iter::once(inner));
        let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

        quote! {
            impl #impl_generics ::tagmock_core::Mockable for #name #ty_generics #where_clause {
                fn type_info() -> ::tagmock_core::TypeInfo {
                    let inner = <#inner as ::tagmock_core::Mockable>::type_info();
                    ::tagmock_core::TypeInfo::of::<Self>(inner.shape)
                }

                fn assign(
                    &mut self,
                    value: ::tagmock_core::Value,
                ) -> ::core::result::Result<(), ::tagmock_core::AssignError> {
                    match value.downcast::<Self>() {
                        ::core::result::Result::Ok(value) => {
                            *self = value;
                            ::core::result::Result::Ok(())
                        }
                        ::core::result::Result::Err(other) => {
                            ::tagmock_core::Mockable::assign(&mut self.0, other)
                        }
                    }
                }

                fn field_mut(
                    &mut self,
                    index: usize,
                ) -> ::core::option::Option<&mut dyn ::tagmock_core::Mockable> {
                    ::tagmock_core::Mockable::field_mut(&mut self.0, index)
                }

                fn element_count(&self) -> usize {
                    ::tagmock_core::Mockable::element_count(&self.0)
                }

                fn element_mut(
                    &mut self,
                    index: usize,
                ) -> ::core::option::Option<&mut dyn ::tagmock_core::Mockable> {
                    ::tagmock_core::Mockable::element_mut(&mut self.0, index)
                }

                fn is_vacant(&self) -> bool {
                    ::tagmock_core::Mockable::is_vacant(&self.0)
                }
            }
        }
    }
}

impl ParsedField {
    /// Reads `#[tag(marker = "...")]` attributes. Fields without any are left out.
    fn from_field(index: usize, field: &Field) -> Result<Option<Self>> {
        let mut tags = Vec::new();
        for attr in &field.attrs {
            if !attr.path().is_ident("tag") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                let marker = meta
                    .path
                    .get_ident()
                    .ok_or_else(|| meta.error("expected a marker name such as `mock`"))?
                    .to_string();
                let raw: LitStr = meta.value()?.parse()?;
                tags.push((marker, raw.value()));
                Ok(())
            })?;
        }
        if tags.is_empty() {
            return Ok(None);
        }
        let Some(ident) = field.ident.clone() else {
            return Ok(None);
        };
        Ok(Some(Self {
            index,
            ident,
            ty: field.ty.clone(),
            tags,
        }))
    }
}
