use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, Pat, Signature, Type,
};

/// Transform an asynchronous test into a synchronous one and inject dependencies.
///
/// Every test gets its own store and its own Rocket instance over that store,
/// so tests never observe each other's data. By default the store lives in
/// memory. With `#[backend_test(mongodb)]` it is a fresh MongoDB database at
/// `ROCKET_DB_URI` (default `mongodb://localhost:27017`), dropped however the
/// test terminates; such tests are ignored unless run with `--ignored`.
///
/// Injectable dependencies are [`rocket::local::asynchronous::Client`] (as
/// `Client`), [`crate::model::store::Store`] (as `Store`), and, for MongoDB
/// tests only, [`mongodb::Database`] (as `Database`), in any order.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Pick the store backing the test.
    let mongodb = match parse_macro_input!(args as Option<Ident>) {
        None => false,
        Some(arg) if arg == "mongodb" => true,
        Some(arg) => {
            return syn::Error::new(arg.span(), "Expected `mongodb` or no argument")
                .into_compile_error()
                .into();
        }
    };

    // Extract the injected arguments and reject invalid function signatures.
    let test_args = match check_sig(item_fn.sig.clone(), mongodb) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    let (maybe_ignore, create_store) = if mongodb {
        (
            quote! { #[ignore = "needs a MongoDB server at ROCKET_DB_URI"] },
            quote! {
                let db_uri = std::env::var("ROCKET_DB_URI")
                    .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
                let db_name = format!("polls_test_{}", crate::model::mongodb::Id::new());
                let db = crate::config::connect(&db_uri, &db_name).await.unwrap();
                let store: crate::model::store::Store =
                    std::sync::Arc::new(crate::model::store::MongoStore::new(&db));
                let db = Some(db);
            },
        )
    } else {
        (
            quote! {},
            quote! {
                let store: crate::model::store::Store =
                    std::sync::Arc::new(crate::model::store::MemoryStore::new());
                let db: Option<mongodb::Database> = None;
            },
        )
    };

    // Rewrite the test function.
    quote! {
        #[test]
        #maybe_ignore
        fn #name() {
            /// Test setup.
            async fn setup() -> (
                rocket::local::asynchronous::Client,
                crate::model::store::Store,
                Option<mongodb::Database>,
            ) {
                log4rs_test_utils::test_logging::init_logging_once_for(
                    ["polls_backend"],
                    None,
                    None,
                );

                #create_store
                let rocket_client = rocket::local::asynchronous::Client::tracked(
                    crate::rocket_for_store(store.clone()),
                )
                .await
                .unwrap();

                (rocket_client, store, db)
            }

            /// The test itself.
            #item_fn

            /// Test cleanup.
            async fn cleanup(db: Option<mongodb::Database>) {
                if let Some(db) = db {
                    db.drop(None).await.unwrap();
                }
            }

            // Create an async runtime. We need a separate one for inside and
            // outside the `catch_unwind`.
            let outer_runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("test-setup-cleanup")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();
            let inner_runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("rocket-worker-test-thread")
                .worker_threads(2)
                .enable_all()
                .build()
                .unwrap();

            // Run the setup.
            let (rocket_client, store, db) = outer_runtime.block_on(setup());

            // Run the test, catching any panics.
            // Use mutexes to safely transfer `!UnwindSafe` data.
            let deps_mutex = std::sync::Mutex::new((rocket_client, store, db.clone()));
            let runtime_mutex = std::sync::Mutex::new(inner_runtime);
            let result = std::panic::catch_unwind(|| {
                #[allow(unused_variables)]
                let (rocket_client, store, db) = deps_mutex.into_inner().unwrap();
                let runtime = runtime_mutex.into_inner().unwrap();

                runtime.block_on(#new_name(#(#test_args),*));
            });

            // Run the cleanup.
            outer_runtime.block_on(cleanup(db));

            // If the test panicked, re-raise the panic.
            if let Err(cause) = result {
                std::panic::resume_unwind(cause);
            }
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
fn check_sig(sig: Signature, mongodb: bool) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut has_client = false;
    let mut has_store = false;
    let mut has_db = false;
    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let Pat::Ident(_) = &*pat_type.pat {
                if let Type::Path(type_path) = &*pat_type.ty {
                    // Valid as the last path segment for any type is itself.
                    if let Some(segment) = type_path.path.segments.last() {
                        if segment.ident == "Client" {
                            if has_client {
                                return Err(syn::Error::new(
                                    input.span(),
                                    "Test cannot accept more than one `rocket::local::asynchronous::Client`",
                                ));
                            }
                            has_client = true;
                            args.push(quote! { rocket_client });
                            continue;
                        } else if segment.ident == "Store" {
                            if has_store {
                                return Err(syn::Error::new(
                                    input.span(),
                                    "Test cannot accept more than one `Store`",
                                ));
                            }
                            has_store = true;
                            args.push(quote! { store });
                            continue;
                        } else if segment.ident == "Database" {
                            if !mongodb {
                                return Err(syn::Error::new(
                                    input.span(),
                                    "Only `#[backend_test(mongodb)]` tests can accept a `mongodb::Database`",
                                ));
                            }
                            if has_db {
                                return Err(syn::Error::new(
                                    input.span(),
                                    "Test cannot accept more than one `mongodb::Database`",
                                ));
                            }
                            has_db = true;
                            args.push(quote! { db.unwrap() });
                            continue;
                        }
                    }
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected one of `client_ident: Client`, `store_ident: Store` or `db_ident: Database`",
        ));
    }

    Ok(args)
}
