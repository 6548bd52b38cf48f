use crate::domain::QueryParameters;

pub const ODE_REST_ENDPOINT: &str = "http://oderest.rsl.wustl.edu/live2/?query=p&output=XML&r=Mf";

/// Compose `base&pt=<token>&k1=v1&k2=v2...` from the present parameters.
///
/// Values are written as-is; they are numbers or ISO timestamps and need no
/// percent-encoding.
pub fn build_query_url(base: &str, product_type: &str, params: &QueryParameters) -> String {
    let joined = params
        .pairs()
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{base}&pt={product_type}&{joined}")
}
