use clap::Parser;

/// Parses from the command line arguments on native and from GET parameters on web.
///
/// On web, `?clizoom=10&cliroad-route` becomes `--zoom 10 --road-route`.
pub fn parse_args<T: Parser>() -> Result<T, clap::Error> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        T::try_parse()
    }
    #[cfg(target_arch = "wasm32")]
    {
        let href = web_sys::window()
            .and_then(|w| w.location().href().ok())
            .unwrap_or_default();
        T::try_parse_from(query_to_args(super::APP_NAME, &href))
    }
}

/// Turn the `cli`-prefixed query parameters of `url` into an argv
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub(crate) fn query_to_args(program: &str, url: &str) -> Vec<String> {
    let mut args = vec![program.to_string()];

    let Some((_, query)) = url.split_once('?') else {
        return args;
    };
    // Drop a trailing fragment, e.g. `#demo`
    let query = query.split('#').next().unwrap_or_default();

    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let Some(flag) = key.strip_prefix("cli") else {
            continue;
        };
        if flag.is_empty() {
            continue;
        }
        args.push(format!("--{flag}"));
        if !value.is_empty() {
            args.push(value.to_string());
        }
    }
    args
}
