use domain::ImageDictionary;
use std::collections::HashMap;

/// Assigns short keys to image URLs.
///
/// Keys already present in the previous dictionary are kept so that records
/// published earlier keep pointing at the same image. New URLs get the next
/// free numeric key.
#[derive(Debug, Default)]
pub struct ImageKeys {
    dict: ImageDictionary,
    by_url: HashMap<String, String>,
    next: u64,
}

impl ImageKeys {
    pub fn new(dict: ImageDictionary) -> Self {
        let by_url = dict
            .iter()
            .map(|(key, url)| (url.clone(), key.clone()))
            .collect();
        let next = dict
            .keys()
            .filter_map(|key| key.parse::<u64>().ok())
            .max()
            .map_or(0, |max| max + 1);
        Self { dict, by_url, next }
    }

    pub fn key_for(&mut self, url: &str) -> String {
        if let Some(key) = self.by_url.get(url) {
            return key.clone();
        }

        let key = self.next.to_string();
        self.next += 1;
        self.dict.insert(key.clone(), url.to_string());
        self.by_url.insert(url.to_string(), key.clone());
        key
    }

    pub fn into_dictionary(self) -> ImageDictionary {
        self.dict
    }
}
