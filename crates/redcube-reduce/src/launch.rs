use redcube_common::TensorLayout;
use redcube_runtime::{ComputeClient, DeviceBuffer, DeviceStatus};

use crate::axis::ReduceAxisKernel;
use crate::instructions::{ReduceInstruction, ReduceOp, ReduceOpVisitor};
use crate::scalar::ReduceScalarKernel;
use crate::{ElectionLog, Numeric, ReduceConfig, ReduceError, ReduceStrategy, ReductionBuffer};

/// The tensor to reduce along with the parameters of the instruction.
#[derive(new, Clone, Copy)]
pub struct ReduceInput<'a, N> {
    /// Device memory holding the elements.
    pub buffer: &'a DeviceBuffer<N>,
    /// How the elements are laid out in `buffer`.
    pub layout: &'a TensorLayout,
    /// Instruction specific parameters, usually empty.
    pub extra_params: &'a [N],
}

impl<N: Numeric> core::fmt::Debug for ReduceInput<'_, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ReduceInput")
            .field("buffer_len", &self.buffer.len())
            .field("layout", self.layout)
            .field("extra_params", &self.extra_params)
            .finish()
    }
}

impl<N: Numeric> ReduceInput<'_, N> {
    fn check(&self) -> Result<(), ReduceError> {
        if self.buffer.len() < self.layout.required_len() {
            DeviceStatus::InvalidValue.check(&format!(
                "Input buffer of {} elements can't hold a tensor spanning {} elements",
                self.buffer.len(),
                self.layout.required_len()
            ))?;
        }
        Ok(())
    }
}

/// Reduces the whole input to a single value, written to `output[0]` and returned.
///
/// `scratch` must have at least one slot per cube of the launch. It is left ready for the next
/// launch: its counter is back to zero once the reduction completes. An empty input produces the
/// starting value of the instruction without launching anything.
pub fn reduce_scalar<N: Numeric, R: ReduceInstruction<N>>(
    client: &ComputeClient,
    input: ReduceInput<'_, N>,
    output: &DeviceBuffer<N>,
    scratch: &ReductionBuffer<N>,
    strategy: &ReduceStrategy,
) -> Result<N, ReduceError> {
    launch_scalar::<N, R>(client, input, output, scratch, None, strategy)
}

/// Same as [reduce_scalar], recording in `election` which cube ran the final fold.
pub fn reduce_scalar_with_election_log<N: Numeric, R: ReduceInstruction<N>>(
    client: &ComputeClient,
    input: ReduceInput<'_, N>,
    output: &DeviceBuffer<N>,
    scratch: &ReductionBuffer<N>,
    election: &ElectionLog,
    strategy: &ReduceStrategy,
) -> Result<N, ReduceError> {
    launch_scalar::<N, R>(client, input, output, scratch, Some(election), strategy)
}

/// Same as [reduce_scalar] with an instruction selected at runtime.
pub fn reduce_scalar_op<N: Numeric>(
    op: ReduceOp,
    client: &ComputeClient,
    input: ReduceInput<'_, N>,
    output: &DeviceBuffer<N>,
    scratch: &ReductionBuffer<N>,
    strategy: &ReduceStrategy,
) -> Result<N, ReduceError> {
    op.dispatch(ScalarLaunch {
        client,
        input,
        output,
        scratch,
        strategy,
    })
}

/// Same as [reduce_scalar] with an instruction selected by its opcode.
///
/// Unknown opcodes fail before any device work.
pub fn reduce_scalar_by_opcode<N: Numeric>(
    opcode: i32,
    client: &ComputeClient,
    input: ReduceInput<'_, N>,
    output: &DeviceBuffer<N>,
    scratch: &ReductionBuffer<N>,
    strategy: &ReduceStrategy,
) -> Result<N, ReduceError> {
    let op = ReduceOp::from_opcode(opcode)?;
    reduce_scalar_op(op, client, input, output, scratch, strategy)
}

/// Reduces every segment of the input along `axis`.
///
/// Results are written contiguously in `output`, following the layout of the input with `axis`
/// removed, which is returned. A zero-length axis gives the starting value of the instruction
/// for every segment.
pub fn reduce_axis<N: Numeric, R: ReduceInstruction<N>>(
    client: &ComputeClient,
    input: ReduceInput<'_, N>,
    axis: usize,
    output: &DeviceBuffer<N>,
    strategy: &ReduceStrategy,
) -> Result<TensorLayout, ReduceError> {
    input.check()?;

    let layout = input.layout;
    let axis_len = layout.shape_of(axis)?;
    let axis_stride = layout.stride_of(axis)?;
    let segments = layout.remove_axis(axis)?;
    let output_layout = TensorLayout::contiguous(segments.shape().to_vec());
    let num_segments = segments.len();

    if output.len() < num_segments {
        DeviceStatus::InvalidValue.check(&format!(
            "Output buffer of {} elements can't hold {num_segments} reductions",
            output.len()
        ))?;
    }

    if num_segments == 0 {
        return Ok(output_layout);
    }

    if axis_len == 0 {
        log::debug!("Axis {axis} is empty, filling {num_segments} outputs without launching");
        let starting_value = R::starting_value(input.extra_params);
        for segment in 0..num_segments {
            output.write(segment, starting_value);
        }
        return Ok(output_layout);
    }

    let config =
        ReduceConfig::generate_axis::<N>(axis_len, num_segments, client.properties(), strategy);
    log::debug!(
        "Reducing {num_segments} segments of {axis_len} elements with {}, {config:?}",
        R::OP
    );

    let kernel = ReduceAxisKernel::<N, R>::new(
        input.buffer,
        &segments,
        axis_len,
        axis_stride,
        input.extra_params,
        output,
    );
    client.launch(
        &kernel,
        config.cube_count,
        config.cube_dim,
        config.shared_memory_size,
    )?;

    Ok(output_layout)
}

/// Same as [reduce_axis] with an instruction selected at runtime.
pub fn reduce_axis_op<N: Numeric>(
    op: ReduceOp,
    client: &ComputeClient,
    input: ReduceInput<'_, N>,
    axis: usize,
    output: &DeviceBuffer<N>,
    strategy: &ReduceStrategy,
) -> Result<TensorLayout, ReduceError> {
    op.dispatch(AxisLaunch {
        client,
        input,
        axis,
        output,
        strategy,
    })
}

/// Same as [reduce_axis] with an instruction selected by its opcode.
///
/// Unknown opcodes fail before any device work.
pub fn reduce_axis_by_opcode<N: Numeric>(
    opcode: i32,
    client: &ComputeClient,
    input: ReduceInput<'_, N>,
    axis: usize,
    output: &DeviceBuffer<N>,
    strategy: &ReduceStrategy,
) -> Result<TensorLayout, ReduceError> {
    let op = ReduceOp::from_opcode(opcode)?;
    reduce_axis_op(op, client, input, axis, output, strategy)
}

fn launch_scalar<N: Numeric, R: ReduceInstruction<N>>(
    client: &ComputeClient,
    input: ReduceInput<'_, N>,
    output: &DeviceBuffer<N>,
    scratch: &ReductionBuffer<N>,
    election: Option<&ElectionLog>,
    strategy: &ReduceStrategy,
) -> Result<N, ReduceError> {
    input.check()?;
    if output.is_empty() {
        DeviceStatus::InvalidValue.check("Output buffer of a scalar reduction is empty")?;
    }

    let len = input.layout.len();
    if len == 0 {
        log::debug!("Input of {} is empty, nothing to launch", R::OP);
        let starting_value = R::starting_value(input.extra_params);
        output.write(0, starting_value);
        return Ok(starting_value);
    }

    let config = ReduceConfig::generate::<N>(len, scratch.capacity(), client.properties(), strategy);
    let num_cubes = config.num_cubes() as usize;
    if num_cubes > scratch.capacity() {
        DeviceStatus::InvalidValue.check(&format!(
            "Scratch buffer has {} slots but the launch needs {num_cubes}",
            scratch.capacity()
        ))?;
    }
    if let Some(election) = election {
        if num_cubes > election.capacity() {
            DeviceStatus::InvalidValue.check(&format!(
                "Election log records {} cubes but the launch needs {num_cubes}",
                election.capacity()
            ))?;
        }
    }
    log::debug!("Reducing {len} elements with {}, {config:?}", R::OP);
    if let Some(election) = election {
        election.clear();
    }

    let kernel = ReduceScalarKernel::<N, R>::new(
        input.buffer,
        input.layout,
        input.extra_params,
        output,
        scratch,
        election,
    );
    let launched = client.launch(
        &kernel,
        config.cube_count,
        config.cube_dim,
        config.shared_memory_size,
    );
    if let Err(err) = launched {
        // Cubes that drew a ticket before the fault left the counter mid-count.
        scratch.reset_counter();
        return Err(err.into());
    }

    Ok(output.read(0))
}

struct ScalarLaunch<'a, N> {
    client: &'a ComputeClient,
    input: ReduceInput<'a, N>,
    output: &'a DeviceBuffer<N>,
    scratch: &'a ReductionBuffer<N>,
    strategy: &'a ReduceStrategy,
}

impl<N: Numeric> ReduceOpVisitor<N> for ScalarLaunch<'_, N> {
    type Output = Result<N, ReduceError>;

    fn visit<R: ReduceInstruction<N>>(self) -> Self::Output {
        reduce_scalar::<N, R>(
            self.client,
            self.input,
            self.output,
            self.scratch,
            self.strategy,
        )
    }
}

struct AxisLaunch<'a, N> {
    client: &'a ComputeClient,
    input: ReduceInput<'a, N>,
    axis: usize,
    output: &'a DeviceBuffer<N>,
    strategy: &'a ReduceStrategy,
}

impl<N: Numeric> ReduceOpVisitor<N> for AxisLaunch<'_, N> {
    type Output = Result<TensorLayout, ReduceError>;

    fn visit<R: ReduceInstruction<N>>(self) -> Self::Output {
        reduce_axis::<N, R>(
            self.client,
            self.input,
            self.axis,
            self.output,
            self.strategy,
        )
    }
}
