//! Split composite metric labels like `"CB Revenue"` into a channel tag and
//! the bare metric name.
use crate::types::Channel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decomposed<'a> {
    pub channel: Option<Channel>,
    pub metric_name: &'a str,
}

/// Ordered channel prefixes plus labels that must stay whole.
#[derive(Debug, Clone)]
pub struct MetricDecomposer {
    channels: Vec<Channel>,
    verbatim_labels: Vec<String>,
}

impl MetricDecomposer {
    pub fn new(channels: Vec<Channel>, verbatim_labels: Vec<String>) -> Self {
        Self {
            channels,
            verbatim_labels,
        }
    }

    /// Match the first channel whose tag is a whole leading token of `label`.
    ///
    /// Matching is case-sensitive and token-exact: `"CBX Revenue"` has no
    /// channel. Without a match the label is returned unchanged.
    pub fn decompose<'a>(&self, label: &'a str) -> Decomposed<'a> {
        let unmatched = Decomposed {
            channel: None,
            metric_name: label,
        };
        if self.verbatim_labels.iter().any(|v| v == label) {
            return unmatched;
        }
        for channel in &self.channels {
            let Some(rest) = label.strip_prefix(channel.as_str()) else {
                continue;
            };
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return Decomposed {
                    channel: Some(*channel),
                    metric_name: rest.trim_start(),
                };
            }
        }
        unmatched
    }
}

impl Default for MetricDecomposer {
    fn default() -> Self {
        Self::new(
            vec![Channel::Cb, Channel::Bg, Channel::Ds, Channel::Total],
            vec!["Total Net Income".to_string()],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_known_prefix() {
        let d = MetricDecomposer::default();
        assert_eq!(
            d.decompose("CB Revenue"),
            Decomposed {
                channel: Some(Channel::Cb),
                metric_name: "Revenue"
            }
        );
        assert_eq!(d.decompose("DS   Net Income").metric_name, "Net Income");
        assert_eq!(d.decompose("Total Revenue").channel, Some(Channel::Total));
    }

    #[test]
    fn unprefixed_label_is_verbatim() {
        let d = MetricDecomposer::default();
        assert_eq!(
            d.decompose("Revenue"),
            Decomposed {
                channel: None,
                metric_name: "Revenue"
            }
        );
    }

    #[test]
    fn prefix_must_be_a_whole_token() {
        let d = MetricDecomposer::default();
        assert_eq!(
            d.decompose("CBX Revenue"),
            Decomposed {
                channel: None,
                metric_name: "CBX Revenue"
            }
        );
        assert_eq!(d.decompose("Totals").channel, None);
        assert_eq!(d.decompose("cb Revenue").channel, None);
    }

    #[test]
    fn bare_tag_has_empty_name() {
        let d = MetricDecomposer::default();
        let out = d.decompose("BG");
        assert_eq!(out.channel, Some(Channel::Bg));
        assert_eq!(out.metric_name, "");
    }

    #[test]
    fn verbatim_labels_are_not_split() {
        let d = MetricDecomposer::default();
        assert_eq!(
            d.decompose("Total Net Income"),
            Decomposed {
                channel: None,
                metric_name: "Total Net Income"
            }
        );
    }

    #[test]
    fn channel_set_is_configurable() {
        let d = MetricDecomposer::new(vec![Channel::Ds], Vec::new());
        assert_eq!(d.decompose("CB Revenue").channel, None);
        assert_eq!(d.decompose("DS Revenue").channel, Some(Channel::Ds));
        assert_eq!(d.decompose("Total Net Income").channel, None);

        let d = MetricDecomposer::new(vec![Channel::Total], Vec::new());
        assert_eq!(d.decompose("Total Net Income").metric_name, "Net Income");
    }
}
