// self
use crate::{_prelude::*, obs::CallKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// Span wrapper used by client operations.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided call kind + stage.
	pub fn new(kind: CallKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("fitbit_client.call", call = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}

	/// Emits a debug event inside the span describing a finished call.
	pub fn record_status(&self, status: u16) {
		#[cfg(feature = "tracing")]
		{
			let _entered = self.span.enter();

			tracing::debug!(status, "Provider responded.");
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = status;
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_passes_output_through() {
		let span = CallSpan::new(CallKind::Refresh, "instrument_passes_output_through");
		let value = span.instrument(async { 42 }).await;

		span.record_status(200);

		assert_eq!(value, 42);
	}

	#[cfg(feature = "tracing")]
	#[derive(Clone, Default)]
	struct SpanLog(Arc<Mutex<Vec<(String, String)>>>);
	#[cfg(feature = "tracing")]
	impl tracing::Subscriber for SpanLog {
		fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
			true
		}

		fn new_span(&self, attrs: &tracing::span::Attributes<'_>) -> tracing::span::Id {
			let mut call = CallField::default();

			attrs.record(&mut call);

			let mut spans = self.0.lock();

			spans.push((attrs.metadata().name().to_owned(), call.0.unwrap_or_default()));

			tracing::span::Id::from_u64(spans.len() as u64)
		}

		fn record(&self, _: &tracing::span::Id, _: &tracing::span::Record<'_>) {}

		fn record_follows_from(&self, _: &tracing::span::Id, _: &tracing::span::Id) {}

		fn event(&self, _: &tracing::Event<'_>) {}

		fn enter(&self, _: &tracing::span::Id) {}

		fn exit(&self, _: &tracing::span::Id) {}
	}

	#[cfg(feature = "tracing")]
	#[derive(Default)]
	struct CallField(Option<String>);
	#[cfg(feature = "tracing")]
	impl tracing::field::Visit for CallField {
		fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
			if field.name() == "call" {
				self.0 = Some(value.to_owned());
			}
		}

		fn record_debug(&mut self, _: &tracing::field::Field, _: &dyn Debug) {}
	}

	#[cfg(feature = "tracing")]
	#[test]
	fn spans_are_named_and_labeled_by_call() {
		let log = SpanLog::default();

		tracing::subscriber::with_default(log.clone(), || {
			CallSpan::new(CallKind::Post, "send").record_status(201);
		});

		assert_eq!(*log.0.lock(), vec![("fitbit_client.call".to_owned(), "post".to_owned())]);
	}
}
