use pretty_assertions::assert_eq;
use redcube_common::{LayoutError, TensorLayout};
use redcube_runtime::{ComputeClient, config::scheduler::CubeOrder};
use redcube_reduce::{
    Max, Mean, ReduceError, ReduceInput, ReduceOp, ReduceStrategy, Sum, reduce_axis,
    reduce_axis_by_opcode, reduce_axis_op,
};

fn cube_of_24<N: Copy>(map: impl Fn(u32) -> N) -> Vec<N> {
    (0..24).map(map).collect()
}

#[test_log::test]
fn sum_along_the_middle_axis() {
    let client = ComputeClient::default();
    let input = client.create(&cube_of_24(|i| i as i32)).unwrap();
    let layout = TensorLayout::contiguous(vec![2, 3, 4]);
    let output = client.empty(8, 0i32).unwrap();

    let output_layout = reduce_axis::<i32, Sum>(
        &client,
        ReduceInput::new(&input, &layout, &[]),
        1,
        &output,
        &ReduceStrategy::default(),
    )
    .unwrap();

    assert_eq!(output_layout, TensorLayout::contiguous(vec![2, 4]));
    assert_eq!(output.to_vec(), vec![12, 15, 18, 21, 48, 51, 54, 57]);
}

#[test_log::test]
fn max_along_the_last_axis() {
    let client = ComputeClient::default();
    let input = client.create(&cube_of_24(|i| i as u32)).unwrap();
    let layout = TensorLayout::contiguous(vec![2, 3, 4]);
    let output = client.empty(6, 0u32).unwrap();

    reduce_axis::<u32, Max>(
        &client,
        ReduceInput::new(&input, &layout, &[]),
        2,
        &output,
        &ReduceStrategy::default(),
    )
    .unwrap();

    assert_eq!(output.to_vec(), vec![3, 7, 11, 15, 19, 23]);
}

#[test_log::test]
fn mean_along_the_first_axis() {
    let client = ComputeClient::default();
    let input = client.create(&cube_of_24(|i| i as f32)).unwrap();
    let layout = TensorLayout::contiguous(vec![2, 3, 4]);
    let output = client.empty(12, 0.0f32).unwrap();

    reduce_axis::<f32, Mean>(
        &client,
        ReduceInput::new(&input, &layout, &[]),
        0,
        &output,
        &ReduceStrategy::default(),
    )
    .unwrap();

    let expected: Vec<f32> = (0..12).map(|i| i as f32 + 6.0).collect();
    assert_eq!(output.to_vec(), expected);
}

#[test_log::test]
fn cubes_stride_over_segments() {
    let values: Vec<i64> = (0..40 * 7).map(|i| (i * 13) % 17).collect();
    let layout = TensorLayout::contiguous(vec![40, 7]);

    for order in [CubeOrder::Sequential, CubeOrder::Shuffled { seed: 9 }] {
        let client = ComputeClient::default().with_cube_order(order);
        let input = client.create(&values).unwrap();
        let output = client.empty(40, 0i64).unwrap();

        reduce_axis_op(
            ReduceOp::Sum,
            &client,
            ReduceInput::new(&input, &layout, &[]),
            1,
            &output,
            &ReduceStrategy::default().with_cube_dim(4).with_cube_count(3),
        )
        .unwrap();

        let expected: Vec<i64> = values.chunks(7).map(|row| row.iter().sum()).collect();
        assert_eq!(output.to_vec(), expected, "{order:?}");
    }
}

#[test_log::test]
fn transposed_input_is_reduced_through_its_strides() {
    let client = ComputeClient::default();
    // A 3x2 view over a 2x3 row-major buffer [[0, 1, 2], [3, 4, 5]].
    let input = client.create(&[0i32, 1, 2, 3, 4, 5]).unwrap();
    let layout = TensorLayout::new(vec![3, 2], vec![1, 3]).unwrap();
    let output = client.empty(3, 0i32).unwrap();

    reduce_axis_by_opcode(
        ReduceOp::Sum.opcode(),
        &client,
        ReduceInput::new(&input, &layout, &[]),
        1,
        &output,
        &ReduceStrategy::default(),
    )
    .unwrap();

    assert_eq!(output.to_vec(), vec![3, 5, 7]);
}

#[test_log::test]
fn empty_axis_gives_starting_values() {
    let client = ComputeClient::default();
    let input = client.create::<i32>(&[]).unwrap();
    let layout = TensorLayout::contiguous(vec![3, 0]);
    let output = client.empty(3, 0i32).unwrap();

    let output_layout = reduce_axis::<i32, Max>(
        &client,
        ReduceInput::new(&input, &layout, &[]),
        1,
        &output,
        &ReduceStrategy::default(),
    )
    .unwrap();

    assert_eq!(output_layout.shape(), &[3]);
    assert_eq!(output.to_vec(), vec![i32::MIN; 3]);
}

#[test_log::test]
fn invalid_axis_and_opcode_are_rejected() {
    let client = ComputeClient::default();
    let input = client.create(&[1.0f64, 2.0]).unwrap();
    let layout = TensorLayout::contiguous(vec![2]);
    let output = client.empty(1, 0.0f64).unwrap();
    let run = |opcode, axis| {
        reduce_axis_by_opcode(
            opcode,
            &client,
            ReduceInput::new(&input, &layout, &[]),
            axis,
            &output,
            &ReduceStrategy::default(),
        )
    };

    assert!(matches!(
        run(0, 1),
        Err(ReduceError::Layout(LayoutError::InvalidAxis { axis: 1, rank: 1 }))
    ));
    assert!(matches!(run(-3, 0), Err(ReduceError::UnsupportedOpCode(-3))));
    assert_eq!(run(0, 0).unwrap().rank(), 0);
    assert_eq!(output.read(0), 3.0);
}
