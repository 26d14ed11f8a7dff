// Stat counters that tick up from zero to the number written in the page,
// keeping a trailing "+" or "%".

use log::{debug, error};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Element;

#[derive(Clone, Debug, PartialEq)]
pub struct CountUp {
    target: u64,
    step: u32,
    plus: bool,
    percent: bool,
}

impl CountUp {
    pub const STEPS: u32 = 50;
    pub const DURATION_MS: f64 = 2000.0;

    /// Every digit in `text` counts toward the target, anything else is dropped.
    pub fn parse(text: &str) -> Option<CountUp> {
        let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
        let target = digits.parse::<u64>().ok()?;
        Some(CountUp {
            target,
            step: 0,
            plus: text.contains('+'),
            percent: text.contains('%'),
        })
    }

    pub fn interval_ms() -> f64 {
        CountUp::DURATION_MS / CountUp::STEPS as f64
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    fn display(&self, value: u64) -> String {
        let mut text = value.to_string();
        if self.plus {
            text.push('+');
        }
        if self.percent {
            text.push('%');
        }
        text
    }
}

impl Iterator for CountUp {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.step >= CountUp::STEPS {
            return None;
        }
        self.step += 1;
        let value = if self.step == CountUp::STEPS {
            self.target
        } else {
            (self.target as f64 * self.step as f64 / CountUp::STEPS as f64).floor() as u64
        };
        Some(self.display(value))
    }
}

type TickCallback = Closure<dyn FnMut()>;

/// Counts `element`'s text up from zero. Elements without digits are left alone.
#[wasm_bindgen]
pub fn animate_counter(element: &Element) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
    let mut counter = match element.text_content().as_deref().and_then(CountUp::parse) {
        Some(counter) => counter,
        None => return Ok(()),
    };
    debug!("counting up to {}", counter.target());

    let handle = Rc::new(RefCell::new(None::<i32>));
    let slot: Rc<RefCell<Option<TickCallback>>> = Rc::new(RefCell::new(None));
    let tick = {
        let element = element.clone();
        let window = window.clone();
        let handle = handle.clone();
        let slot = slot.clone();
        Closure::wrap(Box::new(move || match counter.next() {
            Some(text) => element.set_text_content(Some(&text)),
            None => {
                if let Some(id) = handle.borrow_mut().take() {
                    window.clear_interval_with_handle(id);
                }
                // wasm-bindgen defers freeing a closure dropped mid-call
                slot.borrow_mut().take();
            }
        }) as Box<dyn FnMut()>)
    };

    let id = window.set_interval_with_callback_and_timeout_and_arguments_0(
        tick.as_ref().unchecked_ref(),
        CountUp::interval_ms() as i32,
    );
    match id {
        Ok(id) => {
            *handle.borrow_mut() = Some(id);
            *slot.borrow_mut() = Some(tick);
            Ok(())
        }
        Err(err) => {
            error!("setInterval failed: {:?}", err);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_to_the_target_in_fifty_steps() {
        let values: Vec<String> = CountUp::parse("98%").unwrap().collect();
        assert_eq!(values.len(), 50);
        assert_eq!(values.last().map(String::as_str), Some("98%"));
        assert_eq!(values[24], "49%");
        let numbers: Vec<u64> = values
            .iter()
            .map(|v| v.trim_end_matches('%').parse().unwrap())
            .collect();
        assert!(numbers.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn keeps_both_suffixes_and_drops_separators() {
        let counter = CountUp::parse("10,000+").unwrap();
        assert_eq!(counter.target(), 10_000);
        assert_eq!(counter.last(), Some("10000+".to_owned()));
    }

    #[test]
    fn text_without_digits_is_not_a_counter() {
        assert_eq!(CountUp::parse("AI"), None);
        assert_eq!(CountUp::parse(""), None);
    }

    #[test]
    fn interval_spreads_steps_over_two_seconds() {
        assert_eq!(CountUp::interval_ms(), 40.0);
    }
}
