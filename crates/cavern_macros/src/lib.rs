use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, ToTokens};
use syn::{parse_macro_input, FnArg, ItemFn, LitInt, Pat};

/// Time a system when the `perf_stats` feature is enabled.
///
/// The function body runs with a drop guard that logs the elapsed time
/// through Bevy's `info!` when it exceeds the threshold (default 1 ms).
/// Systems that take `tick: Res<SimTick>` also log every 300th tick so a
/// steady baseline shows up in the log. Without `perf_stats` the guard is
/// compiled out entirely.
///
/// ```ignore
/// #[profile]
/// pub fn update_enemies(tick: Res<SimTick>, /* ... */) { /* ... */ }
///
/// #[profile(4)] // 4 ms threshold
/// pub fn load_level() { /* ... */ }
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_ms: u128 = if attr.is_empty() {
        1
    } else {
        match syn::parse::<LitInt>(attr) {
            Ok(lit) => lit.base10_parse().unwrap_or(1),
            Err(err) => return err.to_compile_error().into(),
        }
    };

    let ItemFn { attrs, vis, sig, block } = input;
    let name = sig.ident.to_string();
    let guard = guard_tokens(&name, threshold_ms, takes_sim_tick(&sig));

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_guard = { #guard };

            #block
        }
    };

    output.into()
}

fn takes_sim_tick(sig: &syn::Signature) -> bool {
    sig.inputs.iter().any(|arg| match arg {
        FnArg::Typed(typed) => {
            let named_tick = matches!(&*typed.pat, Pat::Ident(ident) if ident.ident == "tick");
            named_tick && typed.ty.to_token_stream().to_string().contains("SimTick")
        }
        FnArg::Receiver(_) => false,
    })
}

fn guard_tokens(name: &str, threshold_ms: u128, with_tick: bool) -> TokenStream2 {
    let (tick_field, tick_init, tick_check) = if with_tick {
        (
            quote! { tick: u64, },
            quote! { tick: tick.0, },
            quote! { || self.tick % 300 == 0 },
        )
    } else {
        (quote! {}, quote! {}, quote! {})
    };

    quote! {
        struct ProfileGuard {
            name: &'static str,
            started: std::time::Instant,
            #tick_field
        }

        impl Drop for ProfileGuard {
            fn drop(&mut self) {
                let elapsed = self.started.elapsed();
                if elapsed.as_millis() > #threshold_ms #tick_check {
                    bevy::prelude::info!("[PERF] {}: {:?}", self.name, elapsed);
                }
            }
        }

        ProfileGuard {
            name: #name,
            started: std::time::Instant::now(),
            #tick_init
        }
    }
}
