use proc_macro::TokenStream;
use proc_macro2::Ident;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields, Lit, Meta};

/// Derive a column store for a per-day record whose fields are all `f64`.
///
/// For a struct `Foo` this generates `FooTimeseries` with one `Vec<f64>`
/// per field and the methods `with_capacity`, `push`, `len`, `is_empty`,
/// `column` (lookup by field name) and `columns` (name and slice pairs in
/// declaration order). `Foo::field_names()` lists the columns.
///
/// `#[fluxes(timeseries_name = "Name")]` renames the generated struct.
#[proc_macro_derive(Fluxes, attributes(fluxes))]
pub fn derive_fluxes(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(ts) => ts.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let ts_name = timeseries_name(input)?.unwrap_or_else(|| format_ident!("{}Timeseries", name));

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            name,
            "Fluxes can only be derived for structs",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(
            name,
            "Fluxes can only be derived for structs with named fields",
        ));
    };

    let mut idents: Vec<&Ident> = Vec::with_capacity(named.named.len());
    for field in &named.named {
        if !is_f64(&field.ty) {
            return Err(syn::Error::new_spanned(
                &field.ty,
                "Fluxes derive: all fields must be f64",
            ));
        }
        if let Some(ident) = field.ident.as_ref() {
            idents.push(ident);
        }
    }
    let Some(first) = idents.first().copied() else {
        return Err(syn::Error::new_spanned(
            name,
            "Fluxes struct must have at least one field",
        ));
    };
    let names: Vec<String> = idents.iter().map(|i| i.to_string()).collect();
    let n_fields = idents.len();

    Ok(quote! {
        /// Column store of daily records, one vector per field.
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct #ts_name {
            #(pub #idents: Vec<f64>,)*
        }

        impl #ts_name {
            pub fn with_capacity(n: usize) -> Self {
                Self {
                    #(#idents: Vec::with_capacity(n),)*
                }
            }

            /// Append one day.
            pub fn push(&mut self, f: &#name) {
                #(self.#idents.push(f.#idents);)*
            }

            pub fn len(&self) -> usize {
                self.#first.len()
            }

            pub fn is_empty(&self) -> bool {
                self.#first.is_empty()
            }

            /// Values of the named field, or `None` for an unknown name.
            pub fn column(&self, name: &str) -> Option<&[f64]> {
                match name {
                    #(#names => Some(self.#idents.as_slice()),)*
                    _ => None,
                }
            }

            /// All columns in declaration order.
            pub fn columns(&self) -> impl Iterator<Item = (&'static str, &[f64])> + '_ {
                let cols: [(&'static str, &[f64]); #n_fields] =
                    [#((#names, self.#idents.as_slice()),)*];
                cols.into_iter()
            }
        }

        impl #name {
            pub fn field_names() -> &'static [&'static str] {
                &[#(#names),*]
            }
        }
    })
}

fn timeseries_name(input: &DeriveInput) -> syn::Result<Option<Ident>> {
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("fluxes")) {
        let nested = attr.parse_args_with(
            syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated,
        )?;
        for meta in nested {
            let Meta::NameValue(nv) = meta else { continue };
            if !nv.path.is_ident("timeseries_name") {
                return Err(syn::Error::new_spanned(nv.path, "unknown fluxes attribute"));
            }
            if let syn::Expr::Lit(syn::ExprLit { lit: Lit::Str(s), .. }) = &nv.value {
                return Ok(Some(format_ident!("{}", s.value())));
            }
            return Err(syn::Error::new_spanned(nv.value, "expected a string literal"));
        }
    }
    Ok(None)
}

fn is_f64(ty: &syn::Type) -> bool {
    matches!(ty, syn::Type::Path(p) if p.qself.is_none() && p.path.is_ident("f64"))
}
