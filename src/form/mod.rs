use crate::api::{HttpMethod, OutgoingRequest, ResponseKind};
use crate::util::{merge_param, split_url_query};

pub(crate) const VALIDATION_KEY_FIELD: &str = "validation_key";

/// A page form as seen by the submission logic.
///
/// Setters take `&self`: the backing DOM node owns the state.
pub(crate) trait FormElement {
    /// Raw `method` attribute (may be empty).
    fn method(&self) -> String;
    /// Resolved `action` URL.
    fn action(&self) -> String;
    /// Successful controls as name/value pairs, in document order.
    fn serialize(&self) -> Vec<(String, String)>;
    /// Current value of the `validation_key` field, if the form has one.
    fn validation_key(&self) -> Option<String>;
    fn set_validation_key(&self, value: &str);
}

/// One-way transform producing the next anti-forgery key from the current one.
pub(crate) trait KeyDeriver {
    fn derive(&self, current: &str) -> String;
}

/// Build the request for one submission of `form`.
///
/// The validation key (if the form has one) is derived and written back to the form
/// before anything is read for the body. A falsy override (`None` or empty) means
/// "send the form itself".
pub(crate) fn build_submission(
    form: &impl FormElement,
    deriver: &impl KeyDeriver,
    url_override: Option<&str>,
) -> OutgoingRequest {
    let key = form.validation_key().map(|current| {
        let next = deriver.derive(&current);
        form.set_validation_key(&next);
        next
    });

    let method = HttpMethod::from_form_attr(&form.method());

    let (url, body) = match url_override.filter(|u| !u.is_empty()) {
        None => (form.action(), form.serialize()),
        Some(target) => {
            let mut body = Vec::new();
            if let Some(k) = key {
                body.push((VALIDATION_KEY_FIELD.to_string(), k));
            }
            let (base, params) = split_url_query(target);
            for (k, v) in params {
                merge_param(&mut body, k, v);
            }
            (base, body)
        }
    };

    OutgoingRequest {
        method,
        url,
        body,
        expect: ResponseKind::Script,
    }
}
