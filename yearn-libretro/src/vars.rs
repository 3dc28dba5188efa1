use colored::*;
use log::{debug, info, trace, warn};
use std::collections::BTreeMap;
use std::os::raw::c_char;

use yearn_core::portable::{PStr, PString};

/// One core option and the values it accepts.
#[derive(Clone, Debug)]
pub struct RetroVar {
    key: String,
    value: PString, // Need to be able to pass to C
    description: String,
    extra_desc: String,
    // (value, label)
    values: Vec<(PString, PString)>,
    visible: bool,
}

impl RetroVar {
    pub fn new_v1(
        key: &PStr,
        descr: &PStr,
        info: Option<&PStr>,
        vals: &[(PStr, Option<PStr>)],
        default: Option<&PStr>,
    ) -> Self {
        let mut values: Vec<(PString, PString)> = Vec::new();
        for (val, label) in vals {
            let value: PString = val.into();
            let label = match label {
                Some(p) => p.into(),
                None => value.clone(),
            };
            values.push((value, label));
        }

        // A default that isn't one of the values falls back to the first one
        let value = match default.map(PString::from) {
            Some(d) if values.iter().any(|(v, _)| v == &d) => d,
            _ => match values.first() {
                Some(d) => d.0.clone(),
                None => PString::empty(),
            },
        };

        RetroVar {
            key: String::from(key),
            value,
            description: String::from(descr),
            extra_desc: info.map(String::from).unwrap_or_default(),
            values,
            visible: true,
        }
    }

    /// Parse a v0 definition, `"Description; first|second|third"`. The first
    /// value is the default.
    pub fn new_v0(key: &PStr, descr: &PStr) -> Option<Self> {
        let (description, list) = match descr.split_once("; ") {
            Some(pair) => pair,
            None => {
                warn!("Malformed variable: '{}'", descr);
                return None;
            }
        };

        let mut values: Vec<PString> = Vec::new();
        for v in list.split('|') {
            let v = PString::from(&v);
            if values.contains(&v) {
                warn!("Value '{}' is a duplicate", v);
            } else {
                values.push(v);
            }
        }

        let value = values.first().cloned().unwrap_or_else(PString::empty);

        Some(RetroVar {
            key: String::from(key),
            value,
            description: String::from(description),
            extra_desc: String::new(),
            values: values.into_iter().map(|a| (a.clone(), a)).collect(),
            visible: true,
        })
    }

    pub fn log_var(&self) {
        let mut vals = String::new();
        let cur_val = self.value.to_str();
        for (i, (v, _)) in self.values.iter().enumerate() {
            if i > 0 {
                vals += "|";
            }
            let v = v.to_str();
            if v == cur_val {
                vals += &format!("*{}*", v.blue().bold());
            } else {
                vals += v;
            }
        }
        let key = if self.visible {
            self.key.normal()
        } else {
            self.key.dimmed()
        };
        info!("  {} = {}", key, vals);
        if self.extra_desc.is_empty() {
            info!("    {}", self.description);
        } else {
            info!("    {} - {}", self.description, self.extra_desc);
        }
        for (v, l) in self.values.iter() {
            if v != l {
                debug!("    {} ->> {}", v, l);
            }
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn val_ptr(&self) -> *const c_char {
        self.value.as_ptr()
    }

    pub fn value(&self) -> &str {
        self.value.to_str()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn accepts(&self, value: &str) -> bool {
        self.values.iter().any(|(v, _)| v.to_str() == value)
    }

    pub fn update(&mut self, value: &PStr) -> bool {
        let cstr: PString = value.into();
        if self.values.iter().any(|(v, _)| v == &cstr) {
            self.value = cstr;
            true
        } else {
            false
        }
    }
}

/// Core option store.
///
/// Pointers handed out by `get_var` stay valid until that option's value
/// next changes.
#[derive(Debug)]
pub struct RetroVars {
    vars: BTreeMap<String, RetroVar>,
    dirty: bool,
}

impl Default for RetroVars {
    fn default() -> Self {
        Self::new()
    }
}

impl RetroVars {
    pub fn new() -> Self {
        RetroVars {
            vars: BTreeMap::new(),
            dirty: true,
        }
    }

    fn insert(&mut self, var: RetroVar) {
        if self.vars.contains_key(&var.key) {
            warn!("Variable '{}' already exists", var.key);
        } else {
            self.vars.insert(var.key.clone(), var);
        }
        self.dirty = true;
    }

    pub fn add_v0(&mut self, key: &PStr, descr: &PStr) {
        if let Some(v) = RetroVar::new_v0(key, descr) {
            self.insert(v);
        }
    }

    pub fn add_v1(
        &mut self,
        key: &PStr,
        descr: &PStr,
        info: Option<&PStr>,
        values: &[(PStr, Option<PStr>)],
        default: Option<&PStr>,
    ) {
        self.insert(RetroVar::new_v1(key, descr, info, values, default));
    }

    /// Apply user chosen values; unknown keys and invalid values are skipped.
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, String>) {
        for (k, v) in overrides {
            if let Some(var) = self.vars.get_mut(k) {
                match PStr::try_from(v.as_str()) {
                    Ok(p) if var.update(&p) => {
                        debug!("Variable override: {} = {}", k, v);
                        self.dirty = true;
                    }
                    _ => warn!("Override '{}' is not valid for '{}'", v, k),
                }
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RetroVar> {
        self.vars.values()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn get(&self, k: &str) -> Option<&RetroVar> {
        self.vars.get(k)
    }

    pub fn get_var(&self, k: &str) -> Option<*const c_char> {
        self.vars.get(k).map(|var| {
            trace!("Get variable: {} = {}", k, var.value());
            var.val_ptr()
        })
    }

    pub fn set_val(&mut self, k: &str, v: &PStr) -> bool {
        match self.vars.get_mut(k) {
            Some(var) => {
                if var.update(v) {
                    debug!("Variable update: {} = {}", k, v);
                    self.dirty = true;
                    true
                } else {
                    warn!("Value '{}' is not valid for '{}'", v, k);
                    false
                }
            }
            None => {
                warn!("Variable '{}' not found", k);
                false
            }
        }
    }

    pub fn set_visible(&mut self, k: &str, v: bool) -> bool {
        match self.vars.get_mut(k) {
            Some(var) => {
                debug!("Variable visibility update: {} = {}", k, v);
                var.visible = v;
                true
            }
            None => {
                warn!("Variable '{}' not found", k);
                false
            }
        }
    }

    /// Whether anything changed since the last call.
    pub fn updated(&mut self) -> bool {
        let d = self.dirty;
        self.dirty = false;
        d
    }

    pub fn log_vars(&self) {
        info!("Vars:");
        for v in self.iter() {
            v.log_var();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    fn p(s: &str) -> PStr {
        PStr::try_from(s).unwrap()
    }

    fn value_of(vars: &RetroVars, k: &str) -> String {
        let ptr = vars.get_var(k).unwrap();
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string()
    }

    #[test]
    fn v0_definition() {
        let mut vars = RetroVars::new();
        vars.add_v0(&p("core_palette"), &p("Palette; default|mono|sepia"));

        let var = vars.get("core_palette").unwrap();
        assert_eq!(var.value(), "default");
        assert!(var.accepts("sepia"));
        assert!(!var.accepts("rainbow"));
        assert_eq!(value_of(&vars, "core_palette"), "default");
    }

    #[test]
    fn malformed_v0_ignored() {
        let mut vars = RetroVars::new();
        vars.add_v0(&p("bad"), &p("no separator here"));
        assert!(vars.is_empty());
        assert!(vars.get_var("bad").is_none());
    }

    #[test]
    fn v1_default_and_labels() {
        let mut vars = RetroVars::new();
        let values = [(p("off"), Some(p("Disabled"))), (p("on"), None)];
        vars.add_v1(&p("core_fast"), &p("Fast mode"), None, &values, Some(&p("on")));
        assert_eq!(vars.get("core_fast").unwrap().value(), "on");

        // Default not in the list
        vars.add_v1(&p("core_slow"), &p("Slow"), None, &values, Some(&p("maybe")));
        assert_eq!(vars.get("core_slow").unwrap().value(), "off");
    }

    #[test]
    fn set_validates_and_marks_dirty() {
        let mut vars = RetroVars::new();
        vars.add_v0(&p("core_region"), &p("Region; auto|ntsc|pal"));
        assert!(vars.updated());
        assert!(!vars.updated());

        assert!(!vars.set_val("core_region", &p("secam")));
        assert!(!vars.updated());
        assert!(vars.set_val("core_region", &p("pal")));
        assert!(vars.updated());
        assert_eq!(value_of(&vars, "core_region"), "pal");

        assert!(!vars.set_val("missing", &p("pal")));
    }

    #[test]
    fn duplicates_keep_first() {
        let mut vars = RetroVars::new();
        vars.add_v0(&p("k"), &p("First; a|b"));
        vars.add_v0(&p("k"), &p("Second; c|d"));
        assert_eq!(vars.len(), 1);
        assert_eq!(vars.get("k").unwrap().value(), "a");
    }

    #[test]
    fn overrides_applied() {
        let mut vars = RetroVars::new();
        vars.add_v0(&p("a"), &p("A; x|y"));
        vars.add_v0(&p("b"), &p("B; 1|2"));
        let mut overrides = BTreeMap::new();
        overrides.insert(String::from("a"), String::from("y"));
        overrides.insert(String::from("b"), String::from("3"));
        overrides.insert(String::from("c"), String::from("z"));
        vars.apply_overrides(&overrides);

        assert_eq!(vars.get("a").unwrap().value(), "y");
        assert_eq!(vars.get("b").unwrap().value(), "1");
    }

    #[test]
    fn visibility() {
        let mut vars = RetroVars::new();
        vars.add_v0(&p("a"), &p("A; x|y"));
        assert!(vars.set_visible("a", false));
        assert!(!vars.get("a").unwrap().is_visible());
        assert!(!vars.set_visible("nope", false));
    }
}
